// ⚙️ Settings - Runtime configuration
//
// Layered lowest to highest: built-in defaults, optional TOML file
// (`keypass.toml` unless another path is given), then `KEYPASS_*`
// environment variables. Command line flags are applied on top by the binary.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "keypass.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `tracing` filter directive, e.g. `info` or `keypass_ledger=debug`
    pub log_level: String,
    /// Where logs go in TUI mode. None discards them.
    pub log_file: Option<String>,
    /// Emit JSON instead of text from `replay`
    pub json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            json: false,
        }
    }
}

impl Settings {
    /// Load from `path` (or the default file) plus environment.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("KEYPASS"))
            .build()?
            .try_deserialize()
    }
}
