//! Core compaction logic
//!
//! Compaction MUST follow, in order:
//!
//! 1. Re-read the live WAL and decode its first N record lines
//! 2. Assemble block `pointer` from those records
//! 3. Write the block file (temp, fsync, rename, fsync dir)
//! 4. Write `pointer + 1` plus any records past the first N to the staging
//!    file and fsync it
//! 5. Rename the staging file over the live WAL and fsync the directory
//! 6. Point the WAL writer at the new file
//!
//! Step 5 is the commit point. Any failure before it leaves the old WAL
//! live; the worst leftover is a block file at the pointer id, which
//! recovery treats as an interrupted compaction.
//!
//! The in-memory pending counter is never trusted here: the segment is
//! re-read and re-parsed from disk every time.

use std::path::{Path, PathBuf};

use super::block_file::write_block;
use super::errors::{CompactionError, CompactionErrorCode, CompactionResult};
use crate::codec::Block;
use crate::crash_point::{maybe_crash, points};
use crate::observability::{log_event_with_fields, Event};
use crate::wal::{rotate, wal_path, WalSegment, WalWriter};

/// What a successful compaction produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionOutcome {
    /// Id of the block file written
    pub block_id: u64,
    /// Records folded into the block
    pub records: usize,
    /// Complete records carried over into the new segment
    pub carried: usize,
    /// Pointer of the new live WAL
    pub next_block_id: u64,
}

/// Drains the WAL into numbered block files.
#[derive(Debug, Clone)]
pub struct BlockCompactor {
    data_dir: PathBuf,
    block_size: usize,
}

impl BlockCompactor {
    pub fn new(data_dir: impl Into<PathBuf>, block_size: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            block_size,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Records per block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Compacts the live WAL and resynchronizes `wal` with the result.
    ///
    /// The writer is resynchronized even when compaction reports an error,
    /// since the rename may already have replaced the file it holds.
    ///
    /// # Errors
    ///
    /// - `LEDGER_COMPACTION_FAILED` if the segment is short or rotation failed
    /// - `LEDGER_BLOCK_WRITE_FAILED` if the block file could not be written
    /// - `LEDGER_COMPACTION_CORRUPTION` if a drained line does not parse (FATAL)
    /// - `LEDGER_COMPACTION_WRITER_STALE` if the writer cannot follow (FATAL)
    pub fn compact(&self, wal: &mut WalWriter) -> CompactionResult<CompactionOutcome> {
        let result = self.compact_segment();

        if let Err(ref e) = result {
            if e.code() == CompactionErrorCode::Corruption {
                return result;
            }
        }

        self.resync(wal)?;
        result
    }

    /// Compacts the live WAL on disk without touching any open writer.
    ///
    /// Recovery uses this directly, before a writer exists.
    pub fn compact_segment(&self) -> CompactionResult<CompactionOutcome> {
        maybe_crash(points::COMPACTION_START);

        let segment = WalSegment::read(&wal_path(&self.data_dir))?;
        let n = self.block_size;

        if segment.line_count() < n {
            return Err(CompactionError::failed(format!(
                "WAL segment holds {} records, block size is {}",
                segment.line_count(),
                n
            )));
        }

        let transactions = segment.decode_records(n)?;
        let block_id = segment.pointer();
        let block = Block::new(block_id, transactions);

        write_block(&self.data_dir, &block)?;

        maybe_crash(points::COMPACTION_AFTER_BLOCK_WRITE);

        let carry = segment.bytes_after_records(n);
        let carried = segment.lines()[n..]
            .iter()
            .filter(|line| line.terminated)
            .count();
        let next_block_id = block_id + 1;

        rotate(&self.data_dir, next_block_id, carry)?;

        log_event_with_fields(
            Event::CompactionComplete,
            &[
                ("block_id", &block_id.to_string()),
                ("carried", &carried.to_string()),
                ("next_block_id", &next_block_id.to_string()),
                ("records", &n.to_string()),
            ],
        );

        Ok(CompactionOutcome {
            block_id,
            records: n,
            carried,
            next_block_id,
        })
    }

    /// Reopens `wal` on the live file and resets its pending count from disk.
    ///
    /// Returns the live pointer.
    pub fn resync(&self, wal: &mut WalWriter) -> CompactionResult<u64> {
        let segment = WalSegment::read(&wal_path(&self.data_dir)).map_err(|e| {
            CompactionError::writer_stale(format!("Cannot re-read live WAL: {}", e))
        })?;
        let pending = segment.lines().iter().filter(|l| l.terminated).count();

        wal.reopen(pending).map_err(|e| {
            CompactionError::writer_stale(format!("Cannot reopen live WAL: {}", e))
        })?;

        Ok(segment.pointer())
    }
}
