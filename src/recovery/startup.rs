//! Recovery startup sequence
//!
//! # Startup Sequence (strict order)
//!
//! 1. Remove `*.json.tmp` leftovers of interrupted block writes
//! 2. No WAL: fresh store, create `log.txt` holding pointer `1`, stop
//! 3. Read the pointer from the live WAL
//! 4. Staging file present: discard it (the rename never happened, so the
//!    live WAL is still the pre-compaction file)
//! 5. Block file at the pointer id: the compaction that wrote it did not
//!    commit; re-run compaction from the still-present segment
//! 6. Replay blocks `1..pointer`
//! 7. Replay the live WAL, cutting off a torn final line
//! 8. While N or more records are pending, compact
//! 9. Enter serving state
//!
//! Steps 4 and 5 together complete an interrupted compaction no matter
//! where it stopped. Running the sequence twice yields the same files and
//! the same balances.

use std::path::{Path, PathBuf};

use super::errors::{RecoveryError, RecoveryResult};
use super::replay::{BlockReplayer, WalReplayer};
use crate::compaction::{block_exists, remove_stale_temp_blocks, BlockCompactor};
use crate::crash_point::{maybe_crash, points};
use crate::ledger::Balances;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::wal::{discard_staging, rotate, wal_path, WalSegment};

/// What recovery found and repaired
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// No WAL existed; a fresh one was created
    pub created_fresh: bool,
    /// A leftover staging file was discarded
    pub staging_discarded: bool,
    /// A block at the pointer id was found and compaction re-run
    pub stale_block_recompacted: bool,
    /// `*.json.tmp` files removed
    pub temp_blocks_removed: usize,
    /// Block files replayed
    pub blocks_replayed: u64,
    /// WAL records replayed
    pub wal_records_replayed: usize,
    /// Bytes cut off as a torn final WAL line
    pub torn_bytes_truncated: u64,
    /// A missing final `\n` was restored
    pub terminator_repaired: bool,
    /// Compactions run for a backlog of N or more records
    pub backlog_compactions: usize,
}

impl RecoveryReport {
    /// Whether recovery changed anything on disk
    pub fn repaired(&self) -> bool {
        self.created_fresh
            || self.staging_discarded
            || self.stale_block_recompacted
            || self.temp_blocks_removed > 0
            || self.torn_bytes_truncated > 0
            || self.terminator_repaired
            || self.backlog_compactions > 0
    }
}

/// State rebuilt by recovery
#[derive(Debug, Clone)]
pub struct RecoveredState {
    /// Balances after replaying all blocks and the WAL
    pub balances: Balances,
    /// Pointer of the live WAL
    pub next_block_id: u64,
    /// Complete records in the live WAL
    pub pending: usize,
    pub report: RecoveryReport,
}

/// Recovery Manager that orchestrates startup
pub struct RecoveryManager {
    data_dir: PathBuf,
    block_size: usize,
}

impl RecoveryManager {
    /// Creates a new recovery manager
    pub fn new(data_dir: impl AsRef<Path>, block_size: usize) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            block_size,
        }
    }

    /// Execute the full recovery sequence.
    ///
    /// Returns the rebuilt state on success, a FATAL error on any failure.
    /// The failure is also logged as `RECOVERY_FAILED`.
    pub fn recover(&self) -> RecoveryResult<RecoveredState> {
        maybe_crash(points::RECOVERY_START);
        log_event_with_fields(
            Event::RecoveryStart,
            &[("data_dir", &self.data_dir.display().to_string())],
        );

        self.run().map_err(|e| {
            log_event_with_fields(Event::RecoveryFailed, &[("error", &e.to_string())]);
            e
        })
    }

    fn run(&self) -> RecoveryResult<RecoveredState> {
        let dir = self.data_dir.as_path();
        let mut report = RecoveryReport {
            temp_blocks_removed: remove_stale_temp_blocks(dir)?,
            ..RecoveryReport::default()
        };

        if !wal_path(dir).exists() {
            return self.create_fresh(report);
        }

        let pointer = WalSegment::read(&wal_path(dir))?.pointer();

        if discard_staging(dir)? {
            report.staging_discarded = true;
            log_event_with_fields(
                Event::RecoveryStagingFound,
                &[("pointer", &pointer.to_string())],
            );
        }

        let compactor = BlockCompactor::new(dir, self.block_size);
        let mut next_block_id = pointer;

        if block_exists(dir, pointer) {
            log_event_with_fields(
                Event::RecoveryStaleBlockFound,
                &[("block_id", &pointer.to_string())],
            );
            let segment = WalSegment::read(&wal_path(dir))?;
            if segment.line_count() < self.block_size {
                return Err(RecoveryError::corrupt_block(
                    pointer,
                    format!(
                        "Block exists at the WAL pointer but the WAL holds only {} records",
                        segment.line_count()
                    ),
                ));
            }
            next_block_id = compactor.compact_segment()?.next_block_id;
            report.stale_block_recompacted = true;
        }

        let mut balances = Balances::new();
        let blocks =
            BlockReplayer::replay(dir, next_block_id, self.block_size, &mut balances)?;
        report.blocks_replayed = blocks.blocks_replayed;

        let wal = WalReplayer::replay(dir, &mut balances)?;
        report.wal_records_replayed = wal.records_replayed;
        report.torn_bytes_truncated = wal.torn_bytes_truncated;
        report.terminator_repaired = wal.terminator_repaired;

        maybe_crash(points::RECOVERY_AFTER_REPAIR);

        let mut pending = wal.records_replayed;
        while pending >= self.block_size {
            match compactor.compact_segment() {
                Ok(outcome) => {
                    next_block_id = outcome.next_block_id;
                    pending = outcome.carried;
                    report.backlog_compactions += 1;
                }
                Err(e) => {
                    // Records stay in the WAL; the next append retries.
                    log_event_with_fields(Event::CompactionFailed, &[("error", &e.to_string())]);
                    break;
                }
            }
        }

        log_event_with_fields(
            Event::RecoveryComplete,
            &[
                ("accounts", &balances.len().to_string()),
                ("blocks_replayed", &report.blocks_replayed.to_string()),
                ("next_block_id", &next_block_id.to_string()),
                ("pending", &pending.to_string()),
                ("repaired", &report.repaired().to_string()),
            ],
        );

        Ok(RecoveredState {
            balances,
            next_block_id,
            pending,
            report,
        })
    }

    fn create_fresh(&self, mut report: RecoveryReport) -> RecoveryResult<RecoveredState> {
        let dir = self.data_dir.as_path();

        if block_exists(dir, 1) {
            return Err(RecoveryError::database_corrupt(
                "WAL file is missing but block files exist",
            ));
        }

        // A staging file without a live WAL is an interrupted creation.
        discard_staging(dir)?;
        rotate(dir, 1, b"")?;

        report.created_fresh = true;
        log_event(Event::WalCreated);

        Ok(RecoveredState {
            balances: Balances::new(),
            next_block_id: 1,
            pending: 0,
            report,
        })
    }
}
