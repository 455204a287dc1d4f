//! Record codec errors

use thiserror::Error;

/// Failure to decode a WAL line or a block record.
///
/// Whether a decode failure is a torn write or corruption is decided by
/// the caller (only the final WAL line may be torn).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("empty log line")]
    EmptyLine,

    #[error("unknown record keyword '{0}'")]
    UnknownKeyword(String),

    #[error("{keyword} record expects {expected} fields, got {actual}")]
    FieldCount {
        keyword: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid value '{0}'")]
    InvalidValue(String),

    #[error("invalid block pointer '{0}'")]
    InvalidPointer(String),

    #[error("invalid block JSON: {0}")]
    Json(String),
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
