//! Atomic WAL rotation
//!
//! The WAL pointer only ever moves by replacing the whole WAL file:
//!
//! 1. Write the new pointer line (plus any carried-over records) to the
//!    staging file `log_.txt`
//! 2. fsync the staging file
//! 3. Rename the staging file over `log.txt`
//! 4. fsync the data directory
//!
//! Step 3 is the single commit point. A crash before it leaves the old WAL
//! intact (plus a stale staging file); a crash after it leaves the new WAL.
//! Readers never observe a mix of the two.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::errors::{WalError, WalResult};
use crate::codec::encode_pointer;
use crate::crash_point::{crash_point_enabled, maybe_crash, points};

/// Live WAL file name
pub const WAL_FILE: &str = "log.txt";

/// Staging file name used during rotation
pub const STAGING_FILE: &str = "log_.txt";

/// Path of the live WAL inside a data directory
pub fn wal_path(data_dir: &Path) -> PathBuf {
    data_dir.join(WAL_FILE)
}

/// Path of the staging file inside a data directory
pub fn staging_path(data_dir: &Path) -> PathBuf {
    data_dir.join(STAGING_FILE)
}

/// fsync a directory so that renames and file creations inside it are durable
pub fn fsync_dir(dir: &Path) -> io::Result<()> {
    let handle = OpenOptions::new().read(true).open(dir)?;
    handle.sync_all()
}

/// Writes and fsyncs the staging file.
///
/// Content is the pointer line followed by `carry`, which must consist of
/// whole WAL lines (or be empty).
pub fn write_staging(data_dir: &Path, next_pointer: u64, carry: &[u8]) -> WalResult<()> {
    let path = staging_path(data_dir);

    let mut content = encode_pointer(next_pointer).into_bytes();
    content.push(b'\n');
    content.extend_from_slice(carry);

    let mut file = File::create(&path).map_err(|e| {
        WalError::rotation_failed(
            format!("Failed to create staging file: {}", path.display()),
            e,
        )
    })?;

    if crash_point_enabled(points::ROTATION_STAGING_PARTIAL) {
        let _ = file.write_all(&content[..content.len() / 2]);
        let _ = file.sync_all();
        maybe_crash(points::ROTATION_STAGING_PARTIAL);
    }

    file.write_all(&content).map_err(|e| {
        WalError::rotation_failed(
            format!("Failed to write staging file: {}", path.display()),
            e,
        )
    })?;

    maybe_crash(points::ROTATION_BEFORE_SYNC);

    file.sync_all().map_err(|e| {
        WalError::rotation_failed(
            format!("Failed to fsync staging file: {}", path.display()),
            e,
        )
    })?;

    Ok(())
}

/// Atomically replaces the live WAL with the staging file.
pub fn commit_staging(data_dir: &Path) -> WalResult<()> {
    let staging = staging_path(data_dir);
    let live = wal_path(data_dir);

    maybe_crash(points::ROTATION_BEFORE_RENAME);

    fs::rename(&staging, &live).map_err(|e| {
        WalError::rotation_failed(
            format!(
                "Failed to rename {} over {}",
                staging.display(),
                live.display()
            ),
            e,
        )
    })?;

    fsync_dir(data_dir).map_err(|e| {
        WalError::rotation_failed(
            format!("Failed to fsync data directory: {}", data_dir.display()),
            e,
        )
    })?;

    maybe_crash(points::ROTATION_AFTER_RENAME);

    Ok(())
}

/// Writes a staging file and commits it in one step.
pub fn rotate(data_dir: &Path, next_pointer: u64, carry: &[u8]) -> WalResult<()> {
    write_staging(data_dir, next_pointer, carry)?;
    commit_staging(data_dir)
}

/// Removes a stale staging file. Returns whether one was present.
pub fn discard_staging(data_dir: &Path) -> WalResult<bool> {
    let path = staging_path(data_dir);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(WalError::rotation_failed(
            format!("Failed to remove staging file: {}", path.display()),
            e,
        )),
    }
}
