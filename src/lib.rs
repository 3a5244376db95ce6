// Key/Pass Ledger - Core Library
// Registers parties, records key/pass values between them, finds duplicates.
// Used by the interactive TUI, the `replay` command and the tests.

pub mod date_codec;     // Buddhist-era display dates ↔ canonical YYYY-MM-DD
pub mod errors;
pub mod registry;       // Ordered party names
pub mod store;          // (receiver, kind, sender) → values
pub mod validator;      // Duplicate detection + report
pub mod journal;        // In-memory activity trail
pub mod commands;       // UI requests + outcomes, script parsing
pub mod snapshot;       // Read model for rendering
pub mod session;        // Owns all of the above
pub mod replay;         // Script runner behind `keypass-ledger replay`
pub mod settings;

// Re-export commonly used types
pub use date_codec::{is_canonical, is_date_like, to_canonical, to_display};
pub use errors::{LedgerError, Result};
pub use registry::{Party, UserRegistry};
pub use store::{EntryKey, EntryKind, EntryStore};
pub use validator::{Conflict, DuplicateFinding, ValidationReport, Validator};
pub use journal::{Event, EventType, Journal};
pub use commands::{parse_script, Command, Outcome};
pub use snapshot::{ReceiverRow, SenderValues, Snapshot};
pub use session::{SendForm, Session};
pub use replay::{Replay, ReplayLine};
pub use settings::Settings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
