//! Ledger store engine
//!
//! Every mutation follows the same path:
//!
//! 1. Validate against in-memory balances (reject: nothing written)
//! 2. Append the record to the WAL and fsync (fail: nothing applied)
//! 3. Apply to in-memory balances
//! 4. If N records are pending, compact
//!
//! Once step 2 succeeds the operation is durable and reported as
//! successful. A compaction failure in step 4 leaves the records in the
//! WAL; compaction is retried on the next append and on the next open.

use std::fs;
use std::path::Path;

use super::errors::{StoreError, StoreResult};
use super::lock::DirectoryLock;
use crate::compaction::BlockCompactor;
use crate::config::LedgerConfig;
use crate::codec::encode_line;
use crate::ledger::{Balances, Transaction};
use crate::observability::{log_event_with_fields, Event, LogOutput, Logger};
use crate::recovery::{RecoveryManager, RecoveryReport};
use crate::wal::WalWriter;

/// A crash-consistent ledger on a data directory.
///
/// All mutations take `&mut self`; share a store across threads by
/// wrapping it in a mutex.
pub struct LedgerStore {
    config: LedgerConfig,
    balances: Balances,
    wal: WalWriter,
    compactor: BlockCompactor,
    next_block_id: u64,
    recovery_report: RecoveryReport,
    halted: Option<String>,
    // Declared last so the lock is released after the WAL handle closes
    _lock: DirectoryLock,
}

impl LedgerStore {
    /// Opens (creating if needed) the store in `config.data_dir`.
    ///
    /// Takes the directory lock, then runs recovery. No operation is
    /// accepted before recovery has completed.
    ///
    /// # Errors
    ///
    /// - `LEDGER_CONFIG_INVALID` for a bad configuration
    /// - `LEDGER_STORE_LOCKED` if another store holds the directory
    /// - any recovery error (all FATAL)
    pub fn open(config: LedgerConfig) -> StoreResult<Self> {
        config.validate()?;
        if !config.log_events {
            Logger::set_output(LogOutput::Silent);
        }

        let dir = config.data_path();
        fs::create_dir_all(dir).map_err(|e| {
            StoreError::io(format!("Failed to create data directory {}", dir.display()), e)
        })?;

        let lock = DirectoryLock::acquire(dir)?;
        let state = RecoveryManager::new(dir, config.block_size).recover()?;
        let wal = WalWriter::open(dir, state.pending)?;
        let compactor = BlockCompactor::new(dir, config.block_size);

        log_event_with_fields(
            Event::StoreOpened,
            &[
                ("block_size", &config.block_size.to_string()),
                ("data_dir", &dir.display().to_string()),
                ("next_block_id", &state.next_block_id.to_string()),
                ("pending", &state.pending.to_string()),
            ],
        );

        Ok(Self {
            balances: state.balances,
            wal,
            compactor,
            next_block_id: state.next_block_id,
            recovery_report: state.report,
            halted: None,
            config,
            _lock: lock,
        })
    }

    /// Returns the balance of `account`, 0 if it was never written.
    pub fn get(&self, account: &str) -> i64 {
        self.balances.get(account)
    }

    /// Sets the balance of `account` to `value`.
    pub fn put(&mut self, account: &str, value: i64) -> bool {
        self.try_put(account, value).is_ok()
    }

    /// Adds `value` to `account`.
    pub fn deposit(&mut self, account: &str, value: i64) -> bool {
        self.try_deposit(account, value).is_ok()
    }

    /// Subtracts `value` from `account`; fails if the balance is too low.
    pub fn withdraw(&mut self, account: &str, value: i64) -> bool {
        self.try_withdraw(account, value).is_ok()
    }

    /// Moves `value` from `from` to `to` as one record.
    pub fn transfer(&mut self, from: &str, to: &str, value: i64) -> bool {
        self.try_transfer(from, to, value).is_ok()
    }

    pub fn try_put(&mut self, account: &str, value: i64) -> StoreResult<()> {
        self.execute(Transaction::put(account, value))
    }

    pub fn try_deposit(&mut self, account: &str, value: i64) -> StoreResult<()> {
        self.execute(Transaction::deposit(account, value))
    }

    pub fn try_withdraw(&mut self, account: &str, value: i64) -> StoreResult<()> {
        self.execute(Transaction::withdraw(account, value))
    }

    pub fn try_transfer(&mut self, from: &str, to: &str, value: i64) -> StoreResult<()> {
        self.execute(Transaction::transfer(from, to, value))
    }

    /// Records appended since the last compaction
    pub fn pending_record_count(&self) -> usize {
        self.wal.pending_records()
    }

    /// Id of the next block to be produced (the WAL pointer)
    pub fn next_block_id(&self) -> u64 {
        self.next_block_id
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    /// Read-only view of all balances
    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub fn data_dir(&self) -> &Path {
        self.config.data_path()
    }

    /// What recovery repaired when this store was opened
    pub fn recovery_report(&self) -> &RecoveryReport {
        &self.recovery_report
    }

    /// Whether a fatal error stopped the store from accepting writes
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    fn execute(&mut self, tx: Transaction) -> StoreResult<()> {
        if let Some(reason) = &self.halted {
            return Err(StoreError::Halted {
                reason: reason.clone(),
            });
        }

        self.balances.validate(&tx)?;

        if let Err(e) = self.wal.append(&tx) {
            log_event_with_fields(
                Event::WalAppendFailed,
                &[
                    ("error", &e.to_string()),
                    ("record", &encode_line(&tx)),
                    ("wal_bytes", &self.wal.len().to_string()),
                ],
            );
            if e.is_fatal() {
                self.halt(e.to_string());
            }
            return Err(e.into());
        }

        // Validated against the same balances, so this cannot reject
        self.balances.apply(&tx)?;

        self.compact_pending();
        Ok(())
    }

    /// Compacts while a full block's worth of records is pending.
    fn compact_pending(&mut self) {
        while self.wal.pending_records() >= self.config.block_size {
            match self.compactor.compact(&mut self.wal) {
                Ok(outcome) => self.next_block_id = outcome.next_block_id,
                Err(e) => {
                    log_event_with_fields(Event::CompactionFailed, &[("error", &e.to_string())]);
                    if e.is_fatal() {
                        self.halt(e.to_string());
                    } else {
                        match self.compactor.resync(&mut self.wal) {
                            Ok(pointer) => self.next_block_id = pointer,
                            Err(e) => self.halt(e.to_string()),
                        }
                    }
                    return;
                }
            }
        }
    }

    fn halt(&mut self, reason: String) {
        log_event_with_fields(Event::StoreHalted, &[("reason", &reason)]);
        self.halted = Some(reason);
    }
}
