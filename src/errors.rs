// ⚠️ Errors - What the ledger core can return
//
// Every error is recoverable: an operation that fails leaves the session
// exactly as it was before the call.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Ledger errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("User name must not be empty")]
    EmptyName,
    #[error("User \"{0}\" already exists")]
    DuplicateName(String),
    #[error("User \"{0}\" not found")]
    UserNotFound(String),
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Invalid date \"{0}\", expected DD/MM/YY or DD/MM/YYYY (e.g. 05/07/68 or 05/07/2568)")]
    InvalidDate(String),
    #[error("Date \"{display}\" already recorded from \"{sender}\" to \"{receiver}\"")]
    DuplicateDate {
        display: String,
        sender: String,
        receiver: String,
    },
    #[error("No users to validate")]
    NoUsers,
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl LedgerError {
    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::EmptyName => "EmptyName",
            LedgerError::DuplicateName(_) => "DuplicateName",
            LedgerError::UserNotFound(_) => "UserNotFound",
            LedgerError::MissingField(_) => "MissingField",
            LedgerError::InvalidDate(_) => "InvalidDate",
            LedgerError::DuplicateDate { .. } => "DuplicateDate",
            LedgerError::NoUsers => "NoUsers",
            LedgerError::InvalidCommand(_) => "InvalidCommand",
        }
    }
}
