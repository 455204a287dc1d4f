//! Write-Ahead Log (WAL) subsystem
//!
//! The WAL is `log.txt` in the data directory: a pointer line naming the
//! next block to be produced, followed by one line per transaction not yet
//! folded into a block. No acknowledged write exists unless its line is
//! fsynced.
//!
//! # Design Principles
//!
//! - Durability over throughput: fsync on every append
//! - The pointer moves only through atomic rotation (staging + rename)
//! - Explicit failure over silent recovery, except for a torn final line

mod errors;
mod rotation;
mod segment;
mod writer;

pub use errors::{Severity, WalError, WalErrorCode, WalResult};
pub use rotation::{
    commit_staging, discard_staging, fsync_dir, rotate, staging_path, wal_path, write_staging,
    STAGING_FILE, WAL_FILE,
};
pub use segment::{SegmentLine, WalSegment};
pub use writer::WalWriter;

#[cfg(test)]
pub(crate) use writer::InjectedFailure;
