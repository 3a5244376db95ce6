// 📨 Commands - Requests a UI sends to the session, and what comes back
//
// Both front ends speak this vocabulary: the TUI builds a `Command` once
// the user answers an overlay, and `replay` parses one per script line.
//
// Script syntax, one command per line:
//
// add <name>
// rename <old> <new>
// delete <name>
// send <sender> <key|pass> <receiver> <value>
// validate
// reset
//
// Fields are separated by whitespace and may be wrapped in double quotes;
// a value containing spaces has to be quoted.
// Blank lines and lines starting with `#` are skipped.

use crate::date_codec;
use crate::errors::{LedgerError, Result};
use crate::registry::Party;
use crate::store::EntryKind;
use crate::validator::ValidationReport;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddUser {
        name: String,
    },
    RenameUser {
        old: String,
        new: String,
    },
    DeleteUser {
        name: String,
    },
    RecordEntry {
        sender: String,
        kind: EntryKind,
        receiver: String,
        value: String,
    },
    Validate,
    Reset,
}

impl Command {
    /// Destructive commands the UI must confirm first
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Command::DeleteUser { .. } | Command::Reset)
    }
}

impl FromStr for Command {
    type Err = LedgerError;

    fn from_str(line: &str) -> Result<Self> {
        let tokens = tokenize(line)?;
        let (verb, args) = tokens
            .split_first()
            .ok_or_else(|| LedgerError::InvalidCommand("empty line".to_string()))?;

        match verb.to_lowercase().as_str() {
            "add" => {
                let [name] = expect_args::<1>("add", args)?;
                Ok(Command::AddUser { name })
            }
            "rename" => {
                let [old, new] = expect_args::<2>("rename", args)?;
                Ok(Command::RenameUser { old, new })
            }
            "delete" => {
                let [name] = expect_args::<1>("delete", args)?;
                Ok(Command::DeleteUser { name })
            }
            "send" => {
                // Values with spaces must be quoted; re-joining would lose the spacing
                let [sender, kind, receiver, value] =
                    <[String; 4]>::try_from(args.to_vec()).map_err(|_| {
                        LedgerError::InvalidCommand(
                            "usage: send <sender> <key|pass> <receiver> <value> (quote values with spaces)"
                                .to_string(),
                        )
                    })?;
                Ok(Command::RecordEntry {
                    sender,
                    kind: kind.parse()?,
                    receiver,
                    value,
                })
            }
            "validate" => {
                expect_args::<0>("validate", args)?;
                Ok(Command::Validate)
            }
            "reset" => {
                expect_args::<0>("reset", args)?;
                Ok(Command::Reset)
            }
            other => Err(LedgerError::InvalidCommand(format!(
                "unknown command \"{}\"",
                other
            ))),
        }
    }
}

fn expect_args<const N: usize>(verb: &str, args: &[String]) -> Result<[String; N]> {
    <[String; N]>::try_from(args.to_vec()).map_err(|_| {
        LedgerError::InvalidCommand(format!(
            "\"{}\" takes {} argument(s), got {}",
            verb,
            N,
            args.len()
        ))
    })
}

/// Split on whitespace, keeping double-quoted runs together
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    tokens.push(std::mem::take(&mut current));
                    quoted = false;
                }
            }
            c => current.push(c),
        }
    }

    if in_quotes {
        return Err(LedgerError::InvalidCommand("unterminated quote".to_string()));
    }
    if !current.is_empty() || quoted {
        tokens.push(current);
    }

    Ok(tokens)
}

/// Parse a whole script. Each parsed line keeps its 1-based line number.
pub fn parse_script(text: &str) -> Vec<(usize, Result<Command>)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| (index + 1, line.parse()))
        .collect()
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Successful result of a command
#[derive(Debug, Clone)]
pub enum Outcome {
    UserAdded(Party),
    UserRenamed { from: Party, to: Party },
    UserUnchanged(Party),
    UserDeleted { name: Party, removed_entries: usize },
    EntryRecorded {
        sender: Party,
        kind: EntryKind,
        receiver: Party,
        stored: String,
    },
    Validated(ValidationReport),
    Reset,
}

impl Outcome {
    /// Confirmation text for the user
    pub fn message(&self) -> String {
        match self {
            Outcome::UserAdded(name) => format!("User \"{}\" added", name),
            Outcome::UserRenamed { from, to } => {
                format!("User \"{}\" renamed to \"{}\"", from, to)
            }
            Outcome::UserUnchanged(name) => format!("User \"{}\" unchanged", name),
            Outcome::UserDeleted {
                name,
                removed_entries,
            } => format!(
                "User \"{}\" deleted ({} entr{} removed)",
                name,
                removed_entries,
                if *removed_entries == 1 { "y" } else { "ies" }
            ),
            Outcome::EntryRecorded {
                sender,
                kind,
                receiver,
                stored,
            } => format!(
                "Sent {} \"{}\" from {} to {}",
                kind,
                date_codec::to_display(stored),
                sender,
                receiver
            ),
            Outcome::Validated(report) => report.summary(),
            Outcome::Reset => "All data has been reset".to_string(),
        }
    }
}
