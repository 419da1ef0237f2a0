// crates/hearth-cli/src/config.rs
//
// Runtime configuration for the hearth CLI.
// Loaded from a TOML file or populated with sensible defaults.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use hearth_core::config::TrustConfig;

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct HearthConfig {
    /// Directory holding the RocksDB ledger.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Engine parameters, the `[trust]` table.
    #[serde(default)]
    pub trust: TrustConfig,
}

fn default_data_dir() -> String {
    "~/.hearth/data".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for HearthConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            trust: TrustConfig::default(),
        }
    }
}

impl HearthConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// `[trust]` table fails validation.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_home(path))?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: HearthConfig = toml::from_str(contents)?;
        config.trust.validate()?;
        Ok(config)
    }

    /// `data_dir` with a leading `~` resolved to the home directory.
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

/// Resolve a leading `~/` against the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
