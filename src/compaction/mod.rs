//! Block compaction subsystem
//!
//! Compaction is the ONLY mechanism that advances the WAL pointer.
//!
//! Compaction = block file write + atomic WAL rotation. Once N records have
//! accumulated in the live WAL they are folded into `<pointer>.json` and the
//! WAL is replaced by a file whose first line is `pointer + 1`.
//!
//! # Crash Safety
//!
//! - Crash before the block file is renamed into place: only a `.json.tmp`
//!   is left, which recovery deletes
//! - Crash after the block write but before the rotation commit: the block
//!   at the pointer id is an orphan, recovery re-runs compaction
//! - Crash after the rotation commit: nothing to repair
//!
//! No scenario loses or duplicates a record.

mod block_file;
mod compactor;
mod errors;

pub use block_file::{block_exists, block_path, read_block, remove_stale_temp_blocks, write_block};
pub use compactor::{BlockCompactor, CompactionOutcome};
pub use errors::{CompactionError, CompactionErrorCode, CompactionResult, Severity};
