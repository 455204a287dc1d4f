//! Data directory lock
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on
//! Windows). The lock file `LOCK` is exclusively locked for the lifetime of
//! the store, so two processes can never append to the same WAL.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use thiserror::Error;

/// Lock file name
pub const LOCK_FILE: &str = "LOCK";

/// Errors from directory locking
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock file could not be created or written
    #[error("failed to prepare lock file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Another store holds the lock
    #[error("data directory already in use: {}", .path.display())]
    AlreadyLocked {
        path: PathBuf,
        holder: Option<String>,
    },
}

/// Exclusive lock on a data directory, released on drop.
#[derive(Debug)]
pub struct DirectoryLock {
    /// Kept open to maintain the lock
    file: File,
    path: PathBuf,
}

impl DirectoryLock {
    /// Acquire the lock without waiting.
    ///
    /// # Errors
    ///
    /// `LockError::AlreadyLocked` if another handle holds it.
    pub fn acquire(data_dir: &Path) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let io_err = |source| LockError::Io {
            path: path.clone(),
            source,
        };

        // No truncate here: the holder's identity must survive a failed attempt
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(io_err)?;

        if file.try_lock_exclusive().is_err() {
            let mut holder = String::new();
            let _ = file.read_to_string(&mut holder);
            let holder = holder.trim();
            return Err(LockError::AlreadyLocked {
                path,
                holder: (!holder.is_empty()).then(|| holder.to_string()),
            });
        }

        file.set_len(0).map_err(io_err)?;
        writeln!(
            file,
            "pid={} acquired_at={}",
            std::process::id(),
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        )
        .map_err(io_err)?;
        file.sync_all().map_err(io_err)?;

        Ok(Self { file, path })
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
