//! Store configuration
//!
//! ```json
//! { "data_dir": "./data", "block_size": 50, "log_events": true }
//! ```
//!
//! `data_dir` is required. `block_size` is the number of records folded
//! into each block file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Records per block unless configured otherwise
pub const DEFAULT_BLOCK_SIZE: usize = 50;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Data directory (required)
    pub data_dir: PathBuf,

    /// Records per block (optional, default 50)
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Whether lifecycle events are logged (optional, default true)
    #[serde(default = "default_log_events")]
    pub log_events: bool,
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_log_events() -> bool {
    true
}

impl LedgerConfig {
    pub fn new(data_dir: impl Into<PathBuf>, block_size: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            block_size,
            log_events: true,
        }
    }

    /// Same configuration with event logging switched off
    pub fn quiet(mut self) -> Self {
        self.log_events = false;
        self
    }

    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: LedgerConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }
        if self.block_size == 0 {
            return Err(ConfigError::Invalid("block_size must be > 0".into()));
        }
        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_load_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, r#"{"data_dir": "/var/ledger"}"#);

        let config = LedgerConfig::load(&path).unwrap();
        assert_eq!(config.data_path(), Path::new("/var/ledger"));
        assert_eq!(config.block_size, 50);
        assert!(config.log_events);
    }

    #[test]
    fn test_load_explicit_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{"data_dir": "d", "block_size": 2, "log_events": false}"#,
        );

        let config = LedgerConfig::load(&path).unwrap();
        assert_eq!(config, LedgerConfig::new("d", 2).quiet());
    }

    #[test]
    fn test_missing_data_dir_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, r#"{"block_size": 2}"#);
        assert!(matches!(LedgerConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let err = LedgerConfig::new("d", 0).validate().unwrap_err();
        assert!(err.to_string().contains("block_size"));
    }

    #[test]
    fn test_empty_data_dir_rejected() {
        assert!(LedgerConfig::new("", 2).validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = LedgerConfig::load(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
