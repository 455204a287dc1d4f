//! Compaction-specific error types
//!
//! Error codes:
//! - LEDGER_COMPACTION_FAILED (ERROR severity)
//! - LEDGER_BLOCK_WRITE_FAILED (ERROR severity)
//! - LEDGER_BLOCK_READ_FAILED (ERROR severity)
//! - LEDGER_COMPACTION_CORRUPTION (FATAL severity)
//! - LEDGER_COMPACTION_WRITER_STALE (FATAL severity)
//!
//! A failed compaction before the rotation commit leaves the previous
//! durable state intact, at worst with an orphaned block file at the
//! pointer id. Recovery knows how to finish that.

use std::fmt;
use std::io;

use crate::wal::{WalError, WalErrorCode};

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Compaction failed, serving state is still consistent
    Error,
    /// The segment or the writer can no longer be trusted
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

/// Compaction error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionErrorCode {
    /// General compaction failure (segment too short, rotation failed)
    Failed,
    /// Block file could not be written durably
    BlockWriteFailed,
    /// Block file is missing or does not parse
    BlockReadFailed,
    /// A drained WAL line does not parse
    Corruption,
    /// Rotation committed but the WAL writer could not follow it
    WriterStale,
}

impl CompactionErrorCode {
    /// Returns the stable string code
    pub fn as_str(&self) -> &'static str {
        match self {
            CompactionErrorCode::Failed => "LEDGER_COMPACTION_FAILED",
            CompactionErrorCode::BlockWriteFailed => "LEDGER_BLOCK_WRITE_FAILED",
            CompactionErrorCode::BlockReadFailed => "LEDGER_BLOCK_READ_FAILED",
            CompactionErrorCode::Corruption => "LEDGER_COMPACTION_CORRUPTION",
            CompactionErrorCode::WriterStale => "LEDGER_COMPACTION_WRITER_STALE",
        }
    }

    /// Returns the severity level for this error code
    pub fn severity(&self) -> Severity {
        match self {
            CompactionErrorCode::Corruption | CompactionErrorCode::WriterStale => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for CompactionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compaction error with full context
#[derive(Debug)]
pub struct CompactionError {
    code: CompactionErrorCode,
    message: String,
    block_id: Option<u64>,
    source: Option<io::Error>,
}

impl CompactionError {
    fn new(code: CompactionErrorCode, message: impl Into<String>, source: Option<io::Error>) -> Self {
        Self {
            code,
            message: message.into(),
            block_id: None,
            source,
        }
    }

    /// Creates a general compaction failure error
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(CompactionErrorCode::Failed, message, None)
    }

    /// Creates a block write failure error
    pub fn block_write_failed(block_id: u64, message: impl Into<String>, source: io::Error) -> Self {
        Self::new(CompactionErrorCode::BlockWriteFailed, message, Some(source)).with_block(block_id)
    }

    /// Creates a block read failure error
    pub fn block_read_failed(
        block_id: u64,
        message: impl Into<String>,
        source: Option<io::Error>,
    ) -> Self {
        Self::new(CompactionErrorCode::BlockReadFailed, message, source).with_block(block_id)
    }

    /// Creates a corruption error
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::new(CompactionErrorCode::Corruption, message, None)
    }

    /// Creates a stale writer error
    pub fn writer_stale(message: impl Into<String>) -> Self {
        Self::new(CompactionErrorCode::WriterStale, message, None)
    }

    fn with_block(mut self, block_id: u64) -> Self {
        self.block_id = Some(block_id);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> CompactionErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the block this error concerns, if any
    pub fn block_id(&self) -> Option<u64> {
        self.block_id
    }

    /// Returns whether the underlying cause was a missing file
    pub fn is_not_found(&self) -> bool {
        self.source
            .as_ref()
            .map(|e| e.kind() == io::ErrorKind::NotFound)
            .unwrap_or(false)
    }

    /// Returns the severity of this error
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns whether the store must stop serving
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for CompactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)?;
        if let Some(block_id) = self.block_id {
            write!(f, " (block: {})", block_id)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompactionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for compaction operations
pub type CompactionResult<T> = Result<T, CompactionError>;

impl From<WalError> for CompactionError {
    fn from(err: WalError) -> Self {
        match err.code() {
            WalErrorCode::Corruption => {
                CompactionError::corruption(format!("WAL segment is corrupt: {}", err))
            }
            _ => CompactionError::failed(format!("WAL operation failed: {}", err)),
        }
    }
}
