// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keypass_ledger::{Replay, Session, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "keypass-ledger", version, about = "Record key/pass values between users and find duplicates")]
struct Args {
    /// Optional config file path (TOML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Override log filter (e.g. debug, keypass_ledger=trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Interactive terminal UI (default)
    Tui,
    /// Run a command script against a fresh session
    Replay {
        script: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("loading settings")?;
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }

    match args.mode.unwrap_or(Mode::Tui) {
        Mode::Replay { script, json } => {
            init_logging(&settings.log_level, settings.log_file.as_deref(), true)?;
            run_replay(&script, json || settings.json)
        }
        Mode::Tui => {
            init_logging(&settings.log_level, settings.log_file.as_deref(), false)?;
            run_ui_mode()
        }
    }
}

/// Logs go to `log_file` when set, otherwise to stderr if allowed.
/// The TUI owns the terminal, so without a file its logs are dropped.
fn init_logging(level: &str, log_file: Option<&str>, allow_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_new(level).with_context(|| format!("invalid log filter \"{}\"", level))?;

    if let Some(path) = log_file {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if allow_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

fn run_replay(path: &Path, json: bool) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let replay = Replay::run(&text);

    if json {
        println!("{}", replay.to_json()?);
    } else {
        print!("{}", replay.to_text());
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode() -> Result<()> {
    let mut app = ui::App::new(Session::new());
    ui::run_ui(&mut app)?;

    println!("✅ Session closed (nothing is saved)");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or run a script: keypass-ledger replay <script>");
    std::process::exit(1);
}
