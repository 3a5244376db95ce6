// 🧾 Session - The one object a UI talks to
//
// Owns everything for one interactive session: registry, entry store,
// pending send form, last validation report and the activity journal.
//
// Each mutator either applies completely or returns an error with the
// session untouched. Mutators take `&mut self`, so validation can never
// observe a half-applied change.

use crate::commands::{Command, Outcome};
use crate::errors::{LedgerError, Result};
use crate::journal::{EventType, Journal};
use crate::registry::{Party, Rename, UserRegistry};
use crate::snapshot::Snapshot;
use crate::store::{EntryKind, EntryStore};
use crate::validator::{ValidationReport, Validator};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

// ============================================================================
// SEND FORM
// ============================================================================

/// Pending "send" selection held on behalf of the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendForm {
    pub sender: String,
    pub kind: Option<EntryKind>,
    pub receiver: String,
    pub value: String,
}

impl SendForm {
    pub fn clear(&mut self) {
        *self = SendForm::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == SendForm::default()
    }

    /// Follow a party rename
    fn rename_party(&mut self, old: &str, new: &str) {
        if self.sender == old {
            self.sender = new.to_string();
        }
        if self.receiver == old {
            self.receiver = new.to_string();
        }
    }

    /// Drop selections of a deleted party
    fn forget_party(&mut self, name: &str) {
        if self.sender == name {
            self.sender.clear();
        }
        if self.receiver == name {
            self.receiver.clear();
        }
    }
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Session {
    registry: UserRegistry,
    store: EntryStore,
    validator: Validator,
    report: Option<ValidationReport>,
    form: SendForm,
    journal: Journal,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a party
    pub fn add_user(&mut self, name: &str) -> Result<Party> {
        let name = logged("add user", self.registry.add(name))?;

        info!(user = %name, "user added");
        self.journal.record(EventType::UserAdded, &name, json!({}));
        Ok(name)
    }

    /// Rename a party everywhere: party list, entries in both roles, send form
    pub fn rename_user(&mut self, old: &str, new: &str) -> Result<Party> {
        match logged("rename user", self.registry.rename(old, new))? {
            Rename::Unchanged(name) => Ok(name),
            Rename::Renamed { from, to } => {
                self.store.rename_party(&from, &to);
                self.form.rename_party(&from, &to);

                info!(from = %from, to = %to, "user renamed");
                self.journal
                    .record(EventType::UserRenamed, &to, json!({ "from": from }));
                Ok(to)
            }
        }
    }

    /// Delete a party and every entry it sent or received
    pub fn delete_user(&mut self, name: &str) -> Result<()> {
        self.delete_user_counted(name).map(|_| ())
    }

    fn delete_user_counted(&mut self, name: &str) -> Result<usize> {
        let name = logged("delete user", self.registry.remove(name))?;
        let removed = self.store.remove_party(&name);
        self.form.forget_party(&name);

        info!(user = %name, removed_entries = removed, "user deleted");
        self.journal.record(
            EventType::UserDeleted,
            &name,
            json!({ "removed_entries": removed }),
        );
        Ok(removed)
    }

    /// Record a key or pass from `sender` to `receiver`.
    ///
    /// Returns the stored value (canonical `YYYY-MM-DD` for dates).
    pub fn record_entry(
        &mut self,
        sender: &str,
        kind: EntryKind,
        receiver: &str,
        raw_value: &str,
    ) -> Result<String> {
        let checked = EntryStore::check_fields(sender, receiver, raw_value)
            .and_then(|()| self.check_party(sender))
            .and_then(|()| self.check_party(receiver));
        let result = checked.and_then(|()| self.store.record(sender, kind, receiver, raw_value));
        let stored = logged("record entry", result)?;

        info!(%sender, %kind, %receiver, value = %stored, "entry recorded");
        self.journal.record(
            EventType::EntryRecorded,
            sender,
            json!({ "kind": kind, "receiver": receiver, "value": stored }),
        );
        Ok(stored)
    }

    /// Record whatever the send form holds, clearing it on success
    pub fn submit_send_form(&mut self) -> Result<String> {
        let form = self.form.clone();
        if form.sender.is_empty() {
            return logged("submit form", Err(LedgerError::MissingField("sender")));
        }
        let kind = match form.kind {
            Some(kind) => kind,
            None => return logged("submit form", Err(LedgerError::MissingField("kind"))),
        };

        let stored = self.record_entry(&form.sender, kind, &form.receiver, &form.value)?;
        self.form.clear();
        Ok(stored)
    }

    /// Build a fresh report; it replaces the previous one.
    ///
    /// With no users registered this fails with `NoUsers` and the previous
    /// report is kept.
    pub fn validate_all(&mut self) -> Result<ValidationReport> {
        let report = logged(
            "validate",
            self.validator.validate(&self.registry, &self.store),
        )?;

        debug!(
            users = report.total_users,
            keys = report.total_keys,
            passes = report.total_passes,
            duplicates = report.duplicates.len(),
            "validation finished"
        );
        self.journal.record(
            EventType::Validated,
            "session",
            json!({
                "has_conflicts": report.has_conflicts,
                "duplicates": report.duplicates.len(),
                "total_comparisons": report.total_comparisons,
            }),
        );
        self.report = Some(report.clone());
        Ok(report)
    }

    /// Forget everything: users, entries, form and report
    pub fn reset_all(&mut self) {
        self.registry.clear();
        self.store.clear();
        self.form.clear();
        self.report = None;
        self.journal.clear();

        info!("session reset");
        self.journal.record(EventType::Reset, "session", json!({}));
    }

    /// Run one UI request
    pub fn apply(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::AddUser { name } => self.add_user(&name).map(Outcome::UserAdded),
            Command::RenameUser { old, new } => {
                let name = self.rename_user(&old, &new)?;
                if name == old {
                    Ok(Outcome::UserUnchanged(name))
                } else {
                    Ok(Outcome::UserRenamed { from: old, to: name })
                }
            }
            Command::DeleteUser { name } => {
                let removed_entries = self.delete_user_counted(&name)?;
                Ok(Outcome::UserDeleted {
                    name,
                    removed_entries,
                })
            }
            Command::RecordEntry {
                sender,
                kind,
                receiver,
                value,
            } => {
                let stored = self.record_entry(&sender, kind, &receiver, &value)?;
                Ok(Outcome::EntryRecorded {
                    sender,
                    kind,
                    receiver,
                    stored,
                })
            }
            Command::Validate => self.validate_all().map(Outcome::Validated),
            Command::Reset => {
                self.reset_all();
                Ok(Outcome::Reset)
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.registry, &self.store, &self.form, self.report.as_ref())
    }

    pub fn users(&self) -> &[Party] {
        self.registry.parties()
    }

    pub fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn last_report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn send_form(&self) -> &SendForm {
        &self.form
    }

    pub fn send_form_mut(&mut self) -> &mut SendForm {
        &mut self.form
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn check_party(&self, name: &str) -> Result<()> {
        if name.is_empty() || self.registry.contains(name) {
            // Empty fields are reported by the store as MissingField
            Ok(())
        } else {
            Err(LedgerError::UserNotFound(name.to_string()))
        }
    }
}

fn logged<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        warn!(operation, kind = err.kind(), "{}", err);
    }
    result
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(names: &[&str]) -> Session {
        let mut session = Session::new();
        for name in names {
            session.add_user(name).unwrap();
        }
        session
    }

    #[test]
    fn test_record_requires_registered_parties() {
        let mut session = session_with(&["Alice"]);

        assert_eq!(
            session.record_entry("Alice", EntryKind::Key, "Ghost", "x"),
            Err(LedgerError::UserNotFound("Ghost".to_string()))
        );
        assert_eq!(
            session.record_entry("", EntryKind::Key, "Alice", "x"),
            Err(LedgerError::MissingField("sender"))
        );
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_missing_value_reported_before_unknown_party() {
        let mut session = session_with(&["Bob"]);

        assert_eq!(
            session.record_entry("Ghost", EntryKind::Key, "Bob", ""),
            Err(LedgerError::MissingField("value"))
        );
        assert_eq!(
            session.record_entry("Bob", EntryKind::Pass, "Ghost", "   "),
            Err(LedgerError::MissingField("value"))
        );
        assert_eq!(
            session.record_entry("Ghost", EntryKind::Key, "", "x"),
            Err(LedgerError::MissingField("receiver"))
        );
        assert!(session.store().is_empty());
        assert_eq!(session.journal().len(), 1);
    }

    #[test]
    fn test_rename_updates_form() {
        let mut session = session_with(&["A", "C"]);
        {
            let form = session.send_form_mut();
            form.sender = "A".to_string();
            form.receiver = "C".to_string();
        }

        session.rename_user("A", "B").unwrap();
        assert_eq!(session.send_form().sender, "B");
        assert_eq!(session.send_form().receiver, "C");
    }

    #[test]
    fn test_delete_clears_form_selection() {
        let mut session = session_with(&["A", "C"]);
        {
            let form = session.send_form_mut();
            form.sender = "C".to_string();
            form.receiver = "A".to_string();
            form.value = "v".to_string();
        }

        session.delete_user("A").unwrap();
        assert_eq!(session.send_form().sender, "C");
        assert_eq!(session.send_form().receiver, "");
        assert_eq!(session.send_form().value, "v");
    }

    #[test]
    fn test_submit_send_form() {
        let mut session = session_with(&["Alice", "Bob"]);
        *session.send_form_mut() = SendForm {
            sender: "Alice".to_string(),
            kind: None,
            receiver: "Bob".to_string(),
            value: "05/07/68".to_string(),
        };

        assert_eq!(
            session.submit_send_form(),
            Err(LedgerError::MissingField("kind"))
        );

        session.send_form_mut().kind = Some(EntryKind::Key);
        assert_eq!(session.submit_send_form().unwrap(), "2025-07-05");
        assert!(session.send_form().is_empty());

        // A rejected submit keeps the form so the user can fix it
        *session.send_form_mut() = SendForm {
            sender: "Alice".to_string(),
            kind: Some(EntryKind::Key),
            receiver: "Bob".to_string(),
            value: "05/07/2568".to_string(),
        };
        assert!(matches!(
            session.submit_send_form(),
            Err(LedgerError::DuplicateDate { .. })
        ));
        assert_eq!(session.send_form().value, "05/07/2568");
    }

    #[test]
    fn test_failed_validation_keeps_previous_report() {
        let mut session = Session::new();
        assert_eq!(session.validate_all().unwrap_err(), LedgerError::NoUsers);
        assert!(session.last_report().is_none());

        session.add_user("X").unwrap();
        session.validate_all().unwrap();
        assert!(session.last_report().is_some());
    }

    #[test]
    fn test_journal_only_records_successes() {
        let mut session = session_with(&["Alice", "Bob"]);
        let _ = session.add_user("Alice");
        let _ = session.record_entry("Alice", EntryKind::Key, "Bob", "32/01/2568");
        session
            .record_entry("Alice", EntryKind::Key, "Bob", "ABC")
            .unwrap();

        let types: Vec<EventType> = session
            .journal()
            .events()
            .iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                EventType::UserAdded,
                EventType::UserAdded,
                EventType::EntryRecorded
            ]
        );
    }

    #[test]
    fn test_reset_all() {
        let mut session = session_with(&["Alice", "Bob"]);
        session
            .record_entry("Alice", EntryKind::Pass, "Bob", "p")
            .unwrap();
        session.validate_all().unwrap();
        session.send_form_mut().value = "draft".to_string();

        session.reset_all();

        assert!(session.users().is_empty());
        assert!(session.store().is_empty());
        assert!(session.last_report().is_none());
        assert!(session.send_form().is_empty());
        assert_eq!(session.journal().len(), 1);
        assert_eq!(session.journal().events()[0].event_type, EventType::Reset);
    }

    #[test]
    fn test_apply_outcomes() {
        let mut session = Session::new();

        let outcome = session
            .apply(Command::AddUser {
                name: " Alice ".to_string(),
            })
            .unwrap();
        assert_eq!(outcome.message(), "User \"Alice\" added");

        session
            .apply(Command::AddUser {
                name: "Bob".to_string(),
            })
            .unwrap();

        let outcome = session
            .apply(Command::RecordEntry {
                sender: "Alice".to_string(),
                kind: EntryKind::Key,
                receiver: "Bob".to_string(),
                value: "05/07/68".to_string(),
            })
            .unwrap();
        assert_eq!(outcome.message(), "Sent Key \"05/07/2568\" from Alice to Bob");

        let outcome = session
            .apply(Command::RenameUser {
                old: "Bob".to_string(),
                new: "Bob".to_string(),
            })
            .unwrap();
        assert!(matches!(outcome, Outcome::UserUnchanged(_)));

        let outcome = session
            .apply(Command::DeleteUser {
                name: "Bob".to_string(),
            })
            .unwrap();
        assert_eq!(outcome.message(), "User \"Bob\" deleted (1 entry removed)");
    }
}
