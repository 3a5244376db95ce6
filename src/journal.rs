// 📜 Journal - Activity trail for one session
//
// "Every change is an event": each successful mutation appends one event.
// Rejected operations append nothing. The journal lives in memory only and is
// emptied by a reset (the reset event itself is the first entry afterwards).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    UserAdded,
    UserRenamed,
    UserDeleted,
    EntryRecorded,
    Validated,
    Reset,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::UserAdded => "user_added",
            EventType::UserRenamed => "user_renamed",
            EventType::UserDeleted => "user_deleted",
            EventType::EntryRecorded => "entry_recorded",
            EventType::Validated => "validated",
            EventType::Reset => "reset",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    /// Party (or "session") the event is about
    pub subject: String,
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(event_type: EventType, subject: &str, data: serde_json::Value) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            subject: subject.to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Vec<Event>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event_type: EventType, subject: &str, data: serde_json::Value) {
        self.events.push(Event::new(event_type, subject, data));
    }

    /// Events oldest first
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events about one subject, newest first
    pub fn events_for(&self, subject: &str) -> Vec<&Event> {
        self.events
            .iter()
            .rev()
            .filter(|e| e.subject == subject)
            .collect()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_log() {
        let mut journal = Journal::new();
        journal.record(EventType::UserAdded, "Alice", json!({}));
        journal.record(EventType::UserAdded, "Bob", json!({}));
        journal.record(
            EventType::EntryRecorded,
            "Alice",
            json!({ "kind": "Key", "receiver": "Bob", "value": "ABC" }),
        );

        assert_eq!(journal.len(), 3);
        let alice = journal.events_for("Alice");
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].event_type, EventType::EntryRecorded);
        assert_eq!(alice[0].data["value"], "ABC");
        assert_ne!(journal.events()[0].event_id, journal.events()[1].event_id);
    }

    #[test]
    fn test_event_type_serializes_snake_case() {
        let value = serde_json::to_value(EventType::EntryRecorded).unwrap();
        assert_eq!(value, json!("entry_recorded"));
        assert_eq!(EventType::UserRenamed.to_string(), "user_renamed");
    }
}
