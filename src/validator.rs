// 🔍 Validator - Detect values recorded more than once
//
// Every stored value is flattened into one of two pools (keys, passes) along
// with where it came from. A value seen more than once in the same pool is a
// duplicate finding. Keys and passes never collide with each other.
//
// Walk order is fixed (receivers in registration order, buckets in insertion
// order), so the same session always yields the same report.

use crate::date_codec;
use crate::errors::{LedgerError, Result};
use crate::registry::UserRegistry;
use crate::store::{EntryKind, EntryStore};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// REPORT TYPES
// ============================================================================

/// A value occurring more than once within one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateFinding {
    pub kind: EntryKind,

    /// Human form (Buddhist-era date for canonical dates)
    pub value: String,

    /// Value as stored, used for comparison
    pub stored_value: String,

    /// Distinct receivers, first occurrence first
    pub receivers: Vec<String>,

    /// Distinct senders, first occurrence first
    pub senders: Vec<String>,

    /// Total number of times the value was recorded
    pub occurrences: usize,
}

impl DuplicateFinding {
    pub fn describe(&self) -> String {
        format!(
            "{} \"{}\" x{} | receivers: {} | senders: {}",
            self.kind,
            self.value,
            self.occurrences,
            self.receivers.join(", "),
            self.senders.join(", ")
        )
    }
}

/// Reserved for checks beyond exact duplication. Nothing produces these yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: EntryKind,
    pub value: String,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub has_conflicts: bool,
    pub duplicates: Vec<DuplicateFinding>,
    pub conflicts: Vec<Conflict>,
    pub total_users: usize,
    pub total_keys: usize,
    pub total_passes: usize,
    pub total_comparisons: usize,
    pub validated_at: DateTime<Utc>,
}

impl ValidationReport {
    pub fn summary(&self) -> String {
        if self.has_conflicts {
            format!(
                "Conflicts found: {} duplicate value(s) across {} comparison(s) | users: {}, keys: {}, passes: {}",
                self.duplicates.len(),
                self.total_comparisons,
                self.total_users,
                self.total_keys,
                self.total_passes
            )
        } else {
            format!(
                "All data consistent: {} comparison(s) | users: {}, keys: {}, passes: {}",
                self.total_comparisons, self.total_users, self.total_keys, self.total_passes
            )
        }
    }

    /// Findings for one kind, in report order
    pub fn duplicates_of(&self, kind: EntryKind) -> impl Iterator<Item = &DuplicateFinding> {
        self.duplicates.iter().filter(move |d| d.kind == kind)
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Where a single occurrence was recorded
#[derive(Debug, Clone, Copy)]
struct Origin<'a> {
    receiver: &'a str,
    sender: &'a str,
}

type Pool<'a> = IndexMap<&'a str, Vec<Origin<'a>>>;

#[derive(Debug, Clone, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Validator
    }

    /// Scan the whole store and build a fresh report.
    ///
    /// Fails with `NoUsers` when nobody is registered.
    pub fn validate(&self, registry: &UserRegistry, store: &EntryStore) -> Result<ValidationReport> {
        if registry.is_empty() {
            return Err(LedgerError::NoUsers);
        }

        let mut keys: Pool = IndexMap::new();
        let mut passes: Pool = IndexMap::new();
        let mut total_keys = 0;
        let mut total_passes = 0;

        for receiver in registry.iter() {
            for (key, values) in store.received_by(receiver) {
                let (pool, total) = match key.kind {
                    EntryKind::Key => (&mut keys, &mut total_keys),
                    EntryKind::Pass => (&mut passes, &mut total_passes),
                };

                for value in values {
                    *total += 1;
                    pool.entry(value.as_str()).or_default().push(Origin {
                        receiver: key.receiver.as_str(),
                        sender: key.sender.as_str(),
                    });
                }
            }
        }

        let mut duplicates = Self::find_duplicates(EntryKind::Key, &keys);
        duplicates.extend(Self::find_duplicates(EntryKind::Pass, &passes));

        let conflicts: Vec<Conflict> = Vec::new();
        let has_conflicts = !duplicates.is_empty() || !conflicts.is_empty();

        Ok(ValidationReport {
            has_conflicts,
            duplicates,
            conflicts,
            total_users: registry.len(),
            total_keys,
            total_passes,
            total_comparisons: total_keys + total_passes,
            validated_at: Utc::now(),
        })
    }

    fn find_duplicates(kind: EntryKind, pool: &Pool<'_>) -> Vec<DuplicateFinding> {
        pool.iter()
            .filter(|(_, origins)| origins.len() > 1)
            .map(|(value, origins)| DuplicateFinding {
                kind,
                value: Self::display_value(value),
                stored_value: value.to_string(),
                receivers: distinct(origins.iter().map(|o| o.receiver)),
                senders: distinct(origins.iter().map(|o| o.sender)),
                occurrences: origins.len(),
            })
            .collect()
    }

    fn display_value(value: &str) -> String {
        if date_codec::is_canonical(value) {
            date_codec::to_display(value)
        } else {
            value.to_string()
        }
    }
}

/// Unique names, first occurrence first
fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
