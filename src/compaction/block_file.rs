//! Block file handling
//!
//! Location: `<data_dir>/<id>.json`
//!
//! A block file is written once and never modified. The write goes to
//! `<id>.json.tmp` first, is fsynced, renamed into place, and the directory
//! is fsynced, so a block file that exists under its final name is always
//! complete.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::errors::{CompactionError, CompactionResult};
use crate::codec::{block_file_name, Block};
use crate::wal::fsync_dir;

const TEMP_SUFFIX: &str = ".tmp";

/// Path of block `block_id` inside a data directory
pub fn block_path(data_dir: &Path, block_id: u64) -> PathBuf {
    data_dir.join(block_file_name(block_id))
}

fn temp_block_path(data_dir: &Path, block_id: u64) -> PathBuf {
    data_dir.join(format!("{}{}", block_file_name(block_id), TEMP_SUFFIX))
}

/// Whether a block file exists under its final name
pub fn block_exists(data_dir: &Path, block_id: u64) -> bool {
    block_path(data_dir, block_id).is_file()
}

/// Durably writes a block file.
///
/// An existing file with the same id (an orphan from an interrupted
/// compaction) is replaced.
pub fn write_block(data_dir: &Path, block: &Block) -> CompactionResult<PathBuf> {
    let id = block.block_id;
    let json = block.to_json().map_err(|e| {
        CompactionError::block_write_failed(
            id,
            "Failed to serialize block",
            io::Error::new(io::ErrorKind::InvalidData, e),
        )
    })?;

    let temp = temp_block_path(data_dir, id);
    let target = block_path(data_dir, id);

    let mut file = File::create(&temp).map_err(|e| {
        CompactionError::block_write_failed(
            id,
            format!("Failed to create block file: {}", temp.display()),
            e,
        )
    })?;

    file.write_all(json.as_bytes()).map_err(|e| {
        CompactionError::block_write_failed(
            id,
            format!("Failed to write block file: {}", temp.display()),
            e,
        )
    })?;

    // fsync is mandatory before the rename
    file.sync_all().map_err(|e| {
        CompactionError::block_write_failed(
            id,
            format!("Failed to fsync block file: {}", temp.display()),
            e,
        )
    })?;
    drop(file);

    fs::rename(&temp, &target).map_err(|e| {
        CompactionError::block_write_failed(
            id,
            format!("Failed to rename {} into place", temp.display()),
            e,
        )
    })?;

    fsync_dir(data_dir).map_err(|e| {
        CompactionError::block_write_failed(
            id,
            format!("Failed to fsync data directory: {}", data_dir.display()),
            e,
        )
    })?;

    Ok(target)
}

/// Reads and parses block `block_id`.
///
/// The block's own `BlockID` must match the file name.
pub fn read_block(data_dir: &Path, block_id: u64) -> CompactionResult<Block> {
    let path = block_path(data_dir, block_id);
    let json = fs::read_to_string(&path).map_err(|e| {
        CompactionError::block_read_failed(
            block_id,
            format!("Failed to read block file: {}", path.display()),
            Some(e),
        )
    })?;

    let block = Block::from_json(&json).map_err(|e| {
        CompactionError::block_read_failed(
            block_id,
            format!("Failed to parse block file {}: {}", path.display(), e),
            None,
        )
    })?;

    if block.block_id != block_id {
        return Err(CompactionError::block_read_failed(
            block_id,
            format!(
                "Block file {} declares BlockID {}",
                path.display(),
                block.block_id
            ),
            None,
        ));
    }

    Ok(block)
}

/// Removes `*.json.tmp` files left behind by an interrupted block write.
///
/// Returns the number of files removed.
pub fn remove_stale_temp_blocks(data_dir: &Path) -> CompactionResult<usize> {
    let entries = fs::read_dir(data_dir).map_err(|e| {
        CompactionError::failed(format!(
            "Failed to list data directory {}: {}",
            data_dir.display(),
            e
        ))
    })?;

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(".json.tmp") {
            continue;
        }
        fs::remove_file(entry.path()).map_err(|e| {
            CompactionError::block_write_failed(
                0,
                format!("Failed to remove stale block file: {}", name),
                e,
            )
        })?;
        removed += 1;
    }

    Ok(removed)
}
