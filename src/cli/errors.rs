//! Errors that end a CLI invocation
//!
//! Request-level failures inside `start` are answered on stdout and never
//! become a `CliError`. What lands here stops the process: a bad config,
//! a data directory in the wrong state for the command, a store that will
//! not open, or a broken stdin/stdout.

use std::fmt;
use std::io;
use std::path::Path;

use crate::config::ConfigError;
use crate::store::StoreError;
use crate::wal::WAL_FILE;

/// Why a command stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Config file missing, unreadable or invalid
    ConfigInvalid,
    /// `init` on a directory that already holds a WAL
    AlreadyInitialized,
    /// `start`/`status` on a directory without a WAL
    NotInitialized,
    /// Recovery or locking refused to open the store
    StoreUnavailable,
    /// Reading requests or writing responses failed
    StreamIo,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigInvalid => "LEDGER_CLI_CONFIG_INVALID",
            Self::AlreadyInitialized => "LEDGER_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "LEDGER_CLI_NOT_INITIALIZED",
            Self::StoreUnavailable => "LEDGER_CLI_STORE_UNAVAILABLE",
            Self::StreamIo => "LEDGER_CLI_STREAM_IO",
        }
    }

    /// Process exit status: 2 for invocation mistakes, 1 for runtime failures
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigInvalid | Self::AlreadyInitialized | Self::NotInitialized => 2,
            Self::StoreUnavailable | Self::StreamIo => 1,
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    /// Code of the store error that kept the store closed
    store_code: Option<&'static str>,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            store_code: None,
        }
    }

    /// `init` found an existing WAL in `data_dir`
    pub fn already_initialized(data_dir: &Path) -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            format!(
                "{} already holds {}; refusing to initialize over an existing ledger",
                data_dir.display(),
                WAL_FILE
            ),
        )
    }

    /// No WAL in `data_dir`, so there is no ledger to open
    pub fn not_initialized(data_dir: &Path) -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            format!(
                "{} holds no {}; run `blockledger init --config <file>` first",
                data_dir.display(),
                WAL_FILE
            ),
        )
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying store error code, when the store failed to open
    pub fn store_code(&self) -> Option<&'static str> {
        self.store_code
    }

    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.store_code {
            Some(store_code) => write!(f, "{} ({}): {}", self.code_str(), store_code, self.message),
            None => write!(f, "{}: {}", self.code_str(), self.message),
        }
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::new(CliErrorCode::StreamIo, e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(CliErrorCode::StreamIo, format!("Failed to encode response: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigInvalid, e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self {
            code: CliErrorCode::StoreUnavailable,
            message: e.message(),
            store_code: Some(e.code()),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
