// 🗂️ Entry Store - Key/Pass values recorded between parties
//
// Composite key (receiver, kind, sender) → ordered values, insertion order kept
// for both buckets and values.
//
// Two kinds of value:
// - Dates (DD/MM/YY or DD/MM/YYYY) are canonicalized to YYYY-MM-DD and may
//   appear only once per triplet
// - Anything else is stored trimmed and may repeat freely

use crate::date_codec;
use crate::errors::{LedgerError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTRY KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntryKind {
    Key,
    Pass,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Key => "Key",
            EntryKind::Pass => "Pass",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "key" => Ok(EntryKind::Key),
            "pass" => Ok(EntryKind::Pass),
            "" => Err(LedgerError::MissingField("kind")),
            other => Err(LedgerError::InvalidCommand(format!(
                "unknown kind \"{}\" (expected key or pass)",
                other
            ))),
        }
    }
}

// ============================================================================
// ENTRY KEY
// ============================================================================

/// Bucket address: who received, which kind, who sent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    pub receiver: String,
    pub kind: EntryKind,
    pub sender: String,
}

impl EntryKey {
    pub fn new(receiver: &str, kind: EntryKind, sender: &str) -> Self {
        EntryKey {
            receiver: receiver.to_string(),
            kind,
            sender: sender.to_string(),
        }
    }

    pub fn involves(&self, party: &str) -> bool {
        self.receiver == party || self.sender == party
    }
}

/// Value about to be stored, after date canonicalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    Date(String),
    Text(String),
}

impl StoredValue {
    /// Classify a raw, already trimmed input.
    ///
    /// Date-like input that is not a real calendar date is an error, it is
    /// never silently stored as text.
    pub fn classify(raw: &str) -> Result<Self> {
        if date_codec::is_date_like(raw) {
            return date_codec::to_canonical(raw)
                .map(StoredValue::Date)
                .ok_or_else(|| LedgerError::InvalidDate(raw.to_string()));
        }
        Ok(StoredValue::Text(raw.to_string()))
    }

    pub fn into_string(self) -> String {
        match self {
            StoredValue::Date(s) | StoredValue::Text(s) => s,
        }
    }
}

// ============================================================================
// ENTRY STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct EntryStore {
    buckets: IndexMap<EntryKey, Vec<String>>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value for (receiver, kind, sender) and return what was stored.
    ///
    /// Fails without touching the store on missing fields, malformed dates,
    /// and dates already present in the same triplet.
    pub fn record(
        &mut self,
        sender: &str,
        kind: EntryKind,
        receiver: &str,
        raw_value: &str,
    ) -> Result<String> {
        Self::check_fields(sender, receiver, raw_value)?;
        let raw_value = raw_value.trim();

        let value = StoredValue::classify(raw_value)?;
        let key = EntryKey::new(receiver, kind, sender);

        if let StoredValue::Date(canonical) = &value {
            if self.values(&key).iter().any(|v| v == canonical) {
                return Err(LedgerError::DuplicateDate {
                    display: date_codec::to_display(canonical),
                    sender: sender.to_string(),
                    receiver: receiver.to_string(),
                });
            }
        }

        let stored = value.into_string();
        self.buckets.entry(key).or_default().push(stored.clone());
        Ok(stored)
    }

    /// Presence checks run before anything else looks at the parties
    pub fn check_fields(sender: &str, receiver: &str, raw_value: &str) -> Result<()> {
        if sender.is_empty() {
            return Err(LedgerError::MissingField("sender"));
        }
        if receiver.is_empty() {
            return Err(LedgerError::MissingField("receiver"));
        }
        if raw_value.trim().is_empty() {
            return Err(LedgerError::MissingField("value"));
        }
        Ok(())
    }

    /// Values recorded for one triplet, oldest first
    pub fn values(&self, key: &EntryKey) -> &[String] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rewrite every reference to `old` as `new`, keeping bucket order
    pub fn rename_party(&mut self, old: &str, new: &str) {
        if old == new {
            return;
        }

        let buckets = std::mem::take(&mut self.buckets);
        self.buckets = buckets
            .into_iter()
            .map(|(mut key, values)| {
                if key.receiver == old {
                    key.receiver = new.to_string();
                }
                if key.sender == old {
                    key.sender = new.to_string();
                }
                (key, values)
            })
            .collect();
    }

    /// Drop every bucket where `party` is receiver or sender.
    ///
    /// Returns how many values were removed.
    pub fn remove_party(&mut self, party: &str) -> usize {
        let mut removed = 0;
        self.buckets.retain(|key, values| {
            if key.involves(party) {
                removed += values.len();
                false
            } else {
                true
            }
        });
        removed
    }

    /// Buckets received by `receiver`, in insertion order
    pub fn received_by<'a>(
        &'a self,
        receiver: &'a str,
    ) -> impl Iterator<Item = (&'a EntryKey, &'a [String])> + 'a {
        self.buckets
            .iter()
            .filter(move |(key, _)| key.receiver == receiver)
            .map(|(key, values)| (key, values.as_slice()))
    }

    /// All buckets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&EntryKey, &[String])> {
        self.buckets
            .iter()
            .map(|(key, values)| (key, values.as_slice()))
    }

    /// Total number of recorded values
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of values of one kind
    pub fn count_kind(&self, kind: EntryKind) -> usize {
        self.buckets
            .iter()
            .filter(|(key, _)| key.kind == kind)
            .map(|(_, values)| values.len())
            .sum()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

// ============================================================================
// TESTS
// ============================================================================
