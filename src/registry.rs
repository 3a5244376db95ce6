// 👥 User Registry - Ordered set of party names
//
// A party's identity IS its name. Names are trimmed on the way in, compared
// exactly (case and inner whitespace matter) and kept in registration order.
//
// The registry only guards its own list. Cascading the change into the entry
// store is the session's job, so both sides change in one call.

use crate::errors::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// A named sender/receiver participant
pub type Party = String;

/// Outcome of a rename request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rename {
    /// New name equals the old one, nothing changed
    Unchanged(Party),

    /// Name replaced in the list
    Renamed { from: Party, to: Party },
}

// ============================================================================
// USER REGISTRY
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRegistry {
    parties: Vec<Party>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new party, returning the trimmed name
    pub fn add(&mut self, name: &str) -> Result<Party> {
        let name = Self::clean(name)?;
        if self.contains(&name) {
            return Err(LedgerError::DuplicateName(name));
        }

        self.parties.push(name.clone());
        Ok(name)
    }

    /// Replace `old` with `new` at the same position in the list.
    ///
    /// Renaming to the same name is a successful no-op.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<Rename> {
        let new = Self::clean(new)?;
        let index = self
            .position(old)
            .ok_or_else(|| LedgerError::UserNotFound(old.to_string()))?;

        if new == old {
            return Ok(Rename::Unchanged(new));
        }
        if self.contains(&new) {
            return Err(LedgerError::DuplicateName(new));
        }

        let from = std::mem::replace(&mut self.parties[index], new.clone());
        Ok(Rename::Renamed { from, to: new })
    }

    /// Remove a party from the list
    pub fn remove(&mut self, name: &str) -> Result<Party> {
        let index = self
            .position(name)
            .ok_or_else(|| LedgerError::UserNotFound(name.to_string()))?;
        Ok(self.parties.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parties.iter().any(|p| p == name)
    }

    /// Registration index of a party
    pub fn position(&self, name: &str) -> Option<usize> {
        self.parties.iter().position(|p| p == name)
    }

    /// Parties in registration order
    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn iter(&self) -> impl Iterator<Item = &Party> {
        self.parties.iter()
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    pub fn clear(&mut self) {
        self.parties.clear();
    }

    fn clean(name: &str) -> Result<Party> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        Ok(trimmed.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
