// ▶️ Replay - Run a command script against a fresh session
//
// Every line is applied even when an earlier one failed, so a script shows
// all of its outcomes in one pass. Output is either a per-line listing with
// the last validation report, or JSON carrying the lines and a snapshot.

use crate::commands::parse_script;
use crate::session::Session;
use crate::snapshot::Snapshot;
use serde::Serialize;

/// Outcome of one script line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayLine {
    pub line: usize,
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct Replay {
    pub lines: Vec<ReplayLine>,
    pub snapshot: Snapshot,
}

impl Replay {
    pub fn run(script: &str) -> Self {
        let mut session = Session::new();
        let mut lines = Vec::new();

        for (line, parsed) in parse_script(script) {
            let result = parsed.and_then(|command| session.apply(command));
            lines.push(match result {
                Ok(outcome) => ReplayLine {
                    line,
                    ok: true,
                    message: outcome.message(),
                    error: None,
                },
                Err(err) => ReplayLine {
                    line,
                    ok: false,
                    message: err.to_string(),
                    error: Some(err.kind()),
                },
            });
        }

        Replay {
            lines,
            snapshot: session.snapshot(),
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReplayLine> {
        self.lines.iter().filter(|l| !l.ok)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let output = serde_json::json!({
            "lines": self.lines,
            "snapshot": self.snapshot,
        });
        serde_json::to_string_pretty(&output)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();

        for l in &self.lines {
            let mark = if l.ok { "✓" } else { "✗" };
            out.push_str(&format!("{:>4} {} {}\n", l.line, mark, l.message));
        }

        out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        match &self.snapshot.report {
            Some(report) => {
                out.push_str(&report.summary());
                out.push('\n');
                for finding in &report.duplicates {
                    out.push_str(&format!("  • {}\n", finding.describe()));
                }
            }
            None => out.push_str("No validation run\n"),
        }

        out
    }
}
