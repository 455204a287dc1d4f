//! Recovery error types
//!
//! Error codes:
//! - LEDGER_DATABASE_CORRUPT (FATAL)
//! - LEDGER_BLOCK_MISSING (FATAL)
//! - LEDGER_RECOVERY_FAILED (FATAL)
//!
//! Every recovery error aborts initialization. The only self-healing
//! repair, cutting off a torn final WAL line, is not an error.

use std::fmt;

use crate::compaction::{CompactionError, CompactionErrorCode};
use crate::wal::{WalError, WalErrorCode};

/// Severity levels for recovery errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Store must not open
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Recovery-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryErrorCode {
    /// Durable state is inconsistent
    DatabaseCorrupt,
    /// A block below the pointer does not exist
    BlockMissing,
    /// An I/O step of recovery failed
    RecoveryFailed,
}

impl RecoveryErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            RecoveryErrorCode::DatabaseCorrupt => "LEDGER_DATABASE_CORRUPT",
            RecoveryErrorCode::BlockMissing => "LEDGER_BLOCK_MISSING",
            RecoveryErrorCode::RecoveryFailed => "LEDGER_RECOVERY_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for RecoveryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Recovery error type with full context
#[derive(Debug)]
pub struct RecoveryError {
    code: RecoveryErrorCode,
    message: String,
    /// Block id if applicable
    block_id: Option<u64>,
    /// 1-based WAL line if applicable
    line: Option<usize>,
}

impl RecoveryError {
    fn new(code: RecoveryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            block_id: None,
            line: None,
        }
    }

    /// Create a general corruption error
    pub fn database_corrupt(reason: impl Into<String>) -> Self {
        Self::new(RecoveryErrorCode::DatabaseCorrupt, reason)
    }

    /// Create a corruption error located in a block file
    pub fn corrupt_block(block_id: u64, reason: impl Into<String>) -> Self {
        Self {
            block_id: Some(block_id),
            ..Self::database_corrupt(reason)
        }
    }

    /// Create a corruption error located at a WAL line
    pub fn corrupt_wal_line(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            ..Self::database_corrupt(reason)
        }
    }

    /// Create a missing block error
    pub fn block_missing(block_id: u64) -> Self {
        Self {
            block_id: Some(block_id),
            ..Self::new(
                RecoveryErrorCode::BlockMissing,
                format!("Block file {}.json is missing below the WAL pointer", block_id),
            )
        }
    }

    /// Create a general recovery failed error
    pub fn recovery_failed(reason: impl Into<String>) -> Self {
        Self::new(RecoveryErrorCode::RecoveryFailed, reason)
    }

    /// Returns the error code
    pub fn code(&self) -> RecoveryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the block id if applicable
    pub fn block_id(&self) -> Option<u64> {
        self.block_id
    }

    /// Returns the WAL line if applicable
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for RecoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(block_id) = self.block_id {
            write!(f, " (block: {})", block_id)?;
        }
        if let Some(line) = self.line {
            write!(f, " (line: {})", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for RecoveryError {}

/// Result type for recovery operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;

impl From<WalError> for RecoveryError {
    fn from(err: WalError) -> Self {
        match err.code() {
            WalErrorCode::Corruption => RecoveryError::database_corrupt(err.to_string()),
            _ => RecoveryError::recovery_failed(err.to_string()),
        }
    }
}

impl From<CompactionError> for RecoveryError {
    fn from(err: CompactionError) -> Self {
        match err.code() {
            CompactionErrorCode::Corruption | CompactionErrorCode::BlockReadFailed => {
                RecoveryError::database_corrupt(err.to_string())
            }
            _ => RecoveryError::recovery_failed(err.to_string()),
        }
    }
}
