//! Block and WAL replay for recovery
//!
//! Balances are rebuilt by applying, in order:
//!
//! 1. Every transaction of blocks `1..pointer`
//! 2. Every record line of the live WAL
//!
//! Each transaction is validated against the running balances exactly as
//! the live operations validate it. A rejection means the files on disk
//! do not describe a history the store could have produced: FATAL.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use super::errors::{RecoveryError, RecoveryResult};
use crate::codec::decode_line;
use crate::compaction::read_block;
use crate::ledger::Balances;
use crate::observability::{log_event_with_fields, Event};
use crate::wal::{wal_path, SegmentLine, WalSegment};

/// Statistics from block replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockReplayStats {
    /// Number of block files replayed
    pub blocks_replayed: u64,
    /// Number of transactions applied from blocks
    pub transactions_applied: u64,
}

/// Replays immutable block files
pub struct BlockReplayer;

impl BlockReplayer {
    /// Applies blocks `1..next_block_id` to `balances`.
    ///
    /// Each block must exist, declare its own id, and hold exactly
    /// `block_size` transactions that all apply cleanly.
    pub fn replay(
        data_dir: &Path,
        next_block_id: u64,
        block_size: usize,
        balances: &mut Balances,
    ) -> RecoveryResult<BlockReplayStats> {
        let mut stats = BlockReplayStats::default();

        for block_id in 1..next_block_id {
            let block = read_block(data_dir, block_id).map_err(|e| {
                if e.is_not_found() {
                    RecoveryError::block_missing(block_id)
                } else {
                    RecoveryError::corrupt_block(block_id, e.message())
                }
            })?;

            if block.len() != block_size {
                return Err(RecoveryError::corrupt_block(
                    block_id,
                    format!(
                        "Block holds {} transactions, block size is {}",
                        block.len(),
                        block_size
                    ),
                ));
            }

            for (index, tx) in block.transactions.iter().enumerate() {
                balances.apply(tx).map_err(|e| {
                    RecoveryError::corrupt_block(
                        block_id,
                        format!("Transaction {} does not apply: {}", index, e),
                    )
                })?;
            }

            stats.blocks_replayed += 1;
            stats.transactions_applied += block.len() as u64;
        }

        Ok(stats)
    }
}

/// Statistics from WAL replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalReplayStats {
    /// Pointer read from the WAL
    pub pointer: u64,
    /// Records applied; becomes the pending count
    pub records_replayed: usize,
    /// Bytes cut off as a torn final line
    pub torn_bytes_truncated: u64,
    /// Whether a missing `\n` after a bare pointer line was restored
    pub terminator_repaired: bool,
}

/// Replays the live WAL segment
pub struct WalReplayer;

impl WalReplayer {
    /// Applies every record line of the live WAL to `balances`.
    ///
    /// - A non-final line that does not parse or apply is FATAL
    /// - A final line without `\n` is a torn write and is cut off by
    ///   truncating the file to the line's start offset. The writer
    ///   acknowledges an append only after the whole line and its `\n`
    ///   are synced, so such a line was never acknowledged.
    /// - A terminated final line that does not parse is cut off the same way
    /// - A bare pointer line without `\n` is terminated
    pub fn replay(data_dir: &Path, balances: &mut Balances) -> RecoveryResult<WalReplayStats> {
        let path = wal_path(data_dir);
        let segment = WalSegment::read(&path)?;
        let mut stats = WalReplayStats {
            pointer: segment.pointer(),
            ..WalReplayStats::default()
        };

        let lines = segment.lines();
        for (i, line) in lines.iter().enumerate() {
            let is_final = i + 1 == lines.len();

            if is_final && !line.terminated {
                Self::cut_torn_tail(&path, &segment, line, "line has no terminator", &mut stats)?;
                return Ok(stats);
            }

            match Self::apply_line(line, balances) {
                Ok(()) => stats.records_replayed += 1,
                Err(reason) if is_final && reason.parse_failure => {
                    Self::cut_torn_tail(&path, &segment, line, &reason.message, &mut stats)?;
                    return Ok(stats);
                }
                Err(reason) => {
                    return Err(RecoveryError::corrupt_wal_line(line.number, reason.message));
                }
            }
        }

        if lines.is_empty() && !segment.header_terminated() {
            Self::append_terminator(&path)?;
            stats.terminator_repaired = true;
        }

        Ok(stats)
    }

    fn cut_torn_tail(
        path: &Path,
        segment: &WalSegment,
        line: &SegmentLine,
        reason: &str,
        stats: &mut WalReplayStats,
    ) -> RecoveryResult<()> {
        stats.torn_bytes_truncated = segment.file_len() - line.offset;
        Self::truncate(path, line.offset)?;
        log_event_with_fields(
            Event::WalTornTailTruncated,
            &[
                ("bytes", &stats.torn_bytes_truncated.to_string()),
                ("line", &line.number.to_string()),
                ("offset", &line.offset.to_string()),
                ("reason", reason),
            ],
        );
        Ok(())
    }

    fn apply_line(line: &SegmentLine, balances: &mut Balances) -> Result<(), LineFailure> {
        let tx = decode_line(&line.text).map_err(|e| LineFailure {
            parse_failure: true,
            message: e.to_string(),
        })?;
        balances.apply(&tx).map_err(|e| LineFailure {
            parse_failure: false,
            message: e.to_string(),
        })
    }

    fn truncate(path: &Path, len: u64) -> RecoveryResult<()> {
        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            RecoveryError::recovery_failed(format!(
                "Failed to open WAL for truncation {}: {}",
                path.display(),
                e
            ))
        })?;
        file.set_len(len).map_err(|e| {
            RecoveryError::recovery_failed(format!("Failed to truncate WAL to {}: {}", len, e))
        })?;
        file.sync_all().map_err(|e| {
            RecoveryError::recovery_failed(format!("Failed to fsync truncated WAL: {}", e))
        })
    }

    fn append_terminator(path: &Path) -> RecoveryResult<()> {
        let mut file = OpenOptions::new().append(true).open(path).map_err(|e| {
            RecoveryError::recovery_failed(format!(
                "Failed to open WAL {}: {}",
                path.display(),
                e
            ))
        })?;
        file.write_all(b"\n").map_err(|e| {
            RecoveryError::recovery_failed(format!("Failed to terminate final WAL line: {}", e))
        })?;
        file.sync_all().map_err(|e| {
            RecoveryError::recovery_failed(format!("Failed to fsync WAL: {}", e))
        })
    }
}

struct LineFailure {
    parse_failure: bool,
    message: String,
}
