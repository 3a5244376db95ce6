// 📸 Snapshot - Read model handed to the UI after every operation
//
// One row per registered receiver (registration order), values grouped by
// sender and already converted for display. Stored dates come back as
// DD/MM/YYYY (Buddhist era); everything else is shown as recorded.

use crate::date_codec;
use crate::registry::UserRegistry;
use crate::session::SendForm;
use crate::store::{EntryKind, EntryStore};
use crate::validator::ValidationReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderValues {
    pub sender: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverRow {
    pub receiver: String,
    pub keys: Vec<SenderValues>,
    pub passes: Vec<SenderValues>,
}

impl ReceiverRow {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.passes.is_empty()
    }

    pub fn of_kind(&self, kind: EntryKind) -> &[SenderValues] {
        match kind {
            EntryKind::Key => &self.keys,
            EntryKind::Pass => &self.passes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub users: Vec<String>,
    pub rows: Vec<ReceiverRow>,
    pub total_entries: usize,
    pub form: SendForm,
    pub report: Option<ValidationReport>,
}

impl Snapshot {
    pub fn capture(
        registry: &UserRegistry,
        store: &EntryStore,
        form: &SendForm,
        report: Option<&ValidationReport>,
    ) -> Self {
        Snapshot {
            users: registry.parties().to_vec(),
            rows: registry
                .iter()
                .map(|receiver| receiver_row(store, receiver))
                .collect(),
            total_entries: store.len(),
            form: form.clone(),
            report: report.cloned(),
        }
    }

    pub fn row(&self, receiver: &str) -> Option<&ReceiverRow> {
        self.rows.iter().find(|r| r.receiver == receiver)
    }
}

fn receiver_row(store: &EntryStore, receiver: &str) -> ReceiverRow {
    let mut row = ReceiverRow {
        receiver: receiver.to_string(),
        keys: Vec::new(),
        passes: Vec::new(),
    };

    for (key, values) in store.received_by(receiver) {
        let group = SenderValues {
            sender: key.sender.clone(),
            values: values.iter().map(|v| display_cell(v)).collect(),
        };
        match key.kind {
            EntryKind::Key => row.keys.push(group),
            EntryKind::Pass => row.passes.push(group),
        }
    }

    row
}

fn display_cell(value: &str) -> String {
    if date_codec::is_canonical(value) {
        date_codec::to_display(value)
    } else {
        value.to_string()
    }
}
