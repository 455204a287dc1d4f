//! WAL writer with fsync enforcement
//!
//! - Every append is a single write of `line + '\n'` followed by fsync
//! - Acknowledgment before fsync is forbidden
//! - A failed append is rolled back to the previous file length so that a
//!   half-written line never precedes later records
//!
//! The writer never creates the WAL; recovery does, so that a fresh WAL is
//! produced atomically through the rotation path.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::errors::{WalError, WalResult};
use super::rotation::wal_path;
use crate::codec::encode_line;
use crate::crash_point::{crash_point_enabled, maybe_crash, points};
use crate::ledger::Transaction;

/// Append-only handle on the live WAL file.
pub struct WalWriter {
    wal_path: PathBuf,
    file: File,
    /// Durable length of the file
    len: u64,
    /// Records appended since the last compaction
    pending: usize,
    #[cfg(test)]
    fail_next: Option<InjectedFailure>,
}

/// I/O failure forced onto the next append
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InjectedFailure {
    /// Half the line reaches the file, then the write errors
    Write,
    /// The whole line reaches the file, then fsync errors
    Fsync,
}

impl WalWriter {
    /// Opens the existing WAL in `data_dir` for appending.
    ///
    /// `pending` is the number of records already in the segment, as
    /// established by recovery.
    ///
    /// # Errors
    ///
    /// `LEDGER_WAL_APPEND_FAILED` if the WAL does not exist or cannot be
    /// opened.
    pub fn open(data_dir: &Path, pending: usize) -> WalResult<Self> {
        let wal_path = wal_path(data_dir);
        let (file, len) = Self::open_file(&wal_path)?;

        Ok(Self {
            wal_path,
            file,
            len,
            pending,
            #[cfg(test)]
            fail_next: None,
        })
    }

    fn open_file(path: &Path) -> WalResult<(File, u64)> {
        let file = OpenOptions::new().append(true).open(path).map_err(|e| {
            WalError::append_failed(format!("Failed to open WAL file: {}", path.display()), e)
        })?;

        let len = file
            .metadata()
            .map_err(|e| WalError::append_failed("Failed to read WAL metadata", e))?
            .len();

        Ok((file, len))
    }

    /// Returns the path to the WAL file.
    pub fn path(&self) -> &Path {
        &self.wal_path
    }

    /// Returns the durable length of the WAL in bytes.
    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    /// Returns the number of records appended since the last compaction.
    pub fn pending_records(&self) -> usize {
        self.pending
    }

    /// Appends a transaction and fsyncs.
    ///
    /// Returns the pending record count including this record.
    ///
    /// # Errors
    ///
    /// - `LEDGER_WAL_APPEND_FAILED` if the write fails
    /// - `LEDGER_WAL_FSYNC_FAILED` if fsync fails (FATAL)
    ///
    /// On error the file is truncated back to its previous length and the
    /// pending count is unchanged.
    pub fn append(&mut self, tx: &Transaction) -> WalResult<usize> {
        let mut line = encode_line(tx);
        line.push('\n');
        let bytes = line.as_bytes();

        maybe_crash(points::WAL_BEFORE_APPEND);

        if crash_point_enabled(points::WAL_PARTIAL_APPEND) {
            let _ = self.file.write_all(&bytes[..bytes.len() / 2]);
            let _ = self.file.sync_all();
            maybe_crash(points::WAL_PARTIAL_APPEND);
        }

        if let Err(e) = self.write_record(bytes) {
            self.rollback();
            return Err(WalError::append_failed(
                format!("Failed to append WAL record '{}'", line.trim_end()),
                e,
            ));
        }

        maybe_crash(points::WAL_BEFORE_FSYNC);

        if let Err(e) = self.sync_record() {
            self.rollback();
            return Err(WalError::fsync_failed(
                format!("fsync failed after WAL append '{}'", line.trim_end()),
                e,
            ));
        }

        maybe_crash(points::WAL_AFTER_FSYNC);

        // Only advance after successful fsync
        self.len += bytes.len() as u64;
        self.pending += 1;

        Ok(self.pending)
    }

    fn write_record(&mut self, bytes: &[u8]) -> io::Result<()> {
        #[cfg(test)]
        {
            if self.fail_next == Some(InjectedFailure::Write) {
                self.fail_next = None;
                self.file.write_all(&bytes[..bytes.len() / 2])?;
                return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
            }
        }
        self.file.write_all(bytes)
    }

    fn sync_record(&mut self) -> io::Result<()> {
        #[cfg(test)]
        {
            if self.fail_next == Some(InjectedFailure::Fsync) {
                self.fail_next = None;
                return Err(io::Error::new(io::ErrorKind::Other, "injected fsync failure"));
            }
        }
        self.file.sync_all()
    }

    /// Makes the next append fail with `failure`.
    #[cfg(test)]
    pub(crate) fn fail_next_append(&mut self, failure: InjectedFailure) {
        self.fail_next = Some(failure);
    }

    /// Best-effort truncation back to the last durable length.
    fn rollback(&mut self) {
        let _ = self.file.set_len(self.len);
        let _ = self.file.sync_all();
    }

    /// Reopens the WAL after the file was replaced by rotation.
    ///
    /// The old handle refers to the replaced inode, so it must be swapped.
    pub fn reopen(&mut self, pending: usize) -> WalResult<()> {
        let (file, len) = Self::open_file(&self.wal_path)?;
        self.file = file;
        self.len = len;
        self.pending = pending;
        Ok(())
    }
}
