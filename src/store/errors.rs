//! Store error types
//!
//! Store errors are pass-through: they keep the original error and code
//! from the subsystem that failed (ledger validation, WAL, recovery), and
//! add the store's own codes:
//!
//! - LEDGER_STORE_LOCKED (FATAL)
//! - LEDGER_STORE_HALTED (FATAL)
//! - LEDGER_STORE_IO (FATAL)
//! - LEDGER_CONFIG_INVALID (FATAL)

use std::fmt;
use std::io;

use super::lock::LockError;
use crate::config::ConfigError;
use crate::ledger::LedgerError;
use crate::recovery::RecoveryError;
use crate::wal::WalError;

/// Store error severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The operation failed, the store keeps serving
    Error,
    /// The store cannot serve (or cannot open)
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Error returned by `LedgerStore` operations
#[derive(Debug)]
pub enum StoreError {
    /// Transaction rejected by validation; nothing was written
    Ledger(LedgerError),
    /// WAL append failed; nothing was applied
    Wal(WalError),
    /// Recovery failed; the store did not open
    Recovery(RecoveryError),
    /// Configuration is invalid
    Config(ConfigError),
    /// The data directory lock could not be taken
    Lock(LockError),
    /// A previous fatal error stopped the store from accepting writes
    Halted { reason: String },
    /// Data directory could not be prepared
    Io { message: String, source: io::Error },
}

impl StoreError {
    /// Create a data directory I/O error
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            message: message.into(),
            source,
        }
    }

    /// Returns the stable string code, passed through from the subsystem
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Ledger(e) => e.code().code(),
            StoreError::Wal(e) => e.code().code(),
            StoreError::Recovery(e) => e.code().code(),
            StoreError::Config(_) => "LEDGER_CONFIG_INVALID",
            StoreError::Lock(LockError::AlreadyLocked { .. }) => "LEDGER_STORE_LOCKED",
            StoreError::Lock(LockError::Io { .. }) => "LEDGER_STORE_IO",
            StoreError::Halted { .. } => "LEDGER_STORE_HALTED",
            StoreError::Io { .. } => "LEDGER_STORE_IO",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            StoreError::Ledger(_) => Severity::Error,
            StoreError::Wal(e) if !e.is_fatal() => Severity::Error,
            _ => Severity::Fatal,
        }
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Human-readable message without code or severity
    pub fn message(&self) -> String {
        match self {
            StoreError::Ledger(e) => e.message().to_string(),
            StoreError::Wal(e) => e.message().to_string(),
            StoreError::Recovery(e) => e.message().to_string(),
            StoreError::Config(e) => e.to_string(),
            StoreError::Lock(e) => e.to_string(),
            StoreError::Halted { reason } => format!("Store halted after fatal error: {}", reason),
            StoreError::Io { message, source } => format!("{}: {}", message, source),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Subsystem errors already carry severity and code
            StoreError::Ledger(e) => write!(f, "{}", e),
            StoreError::Wal(e) => write!(f, "{}", e),
            StoreError::Recovery(e) => write!(f, "{}", e),
            _ => write!(f, "[{}] {}: {}", self.severity(), self.code(), self.message()),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Ledger(e) => Some(e),
            StoreError::Wal(e) => Some(e),
            StoreError::Recovery(e) => Some(e),
            StoreError::Config(e) => Some(e),
            StoreError::Lock(e) => Some(e),
            StoreError::Io { source, .. } => Some(source),
            StoreError::Halted { .. } => None,
        }
    }
}

impl From<LedgerError> for StoreError {
    fn from(err: LedgerError) -> Self {
        StoreError::Ledger(err)
    }
}

impl From<WalError> for StoreError {
    fn from(err: WalError) -> Self {
        StoreError::Wal(err)
    }
}

impl From<RecoveryError> for StoreError {
    fn from(err: RecoveryError) -> Self {
        StoreError::Recovery(err)
    }
}

impl From<ConfigError> for StoreError {
    fn from(err: ConfigError) -> Self {
        StoreError::Config(err)
    }
}

impl From<LockError> for StoreError {
    fn from(err: LockError) -> Self {
        StoreError::Lock(err)
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
