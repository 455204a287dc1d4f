//! Crash point injection for testing durability
//!
//! Crash points are enabled via the `BLOCKLEDGER_CRASH_POINT` environment
//! variable. When the named point is reached the process terminates via
//! `std::process::abort()`: no cleanup, no unwinding, no buffered flushes.
//!
//! # Usage
//!
//! ```ignore
//! use blockledger::crash_point::{maybe_crash, points};
//!
//! maybe_crash(points::ROTATION_BEFORE_RENAME);
//! ```
//!
//! # Testing
//!
//! ```bash
//! BLOCKLEDGER_CRASH_POINT=rotation_before_rename blockledger start --config ledger.json
//! ```

use std::sync::OnceLock;

/// Environment variable naming the active crash point
pub const CRASH_POINT_ENV: &str = "BLOCKLEDGER_CRASH_POINT";

static CRASH_POINT: OnceLock<Option<String>> = OnceLock::new();

#[inline]
fn get_crash_point() -> Option<&'static str> {
    CRASH_POINT
        .get_or_init(|| std::env::var(CRASH_POINT_ENV).ok())
        .as_deref()
}

/// Returns true if `BLOCKLEDGER_CRASH_POINT` equals the given name.
#[inline]
pub fn crash_point_enabled(name: &str) -> bool {
    get_crash_point().map(|p| p == name).unwrap_or(false)
}

/// Abort the process if the named crash point is enabled.
///
/// No-op when the environment variable is unset or names another point.
#[inline]
pub fn maybe_crash(name: &str) {
    if crash_point_enabled(name) {
        eprintln!("[CRASH] Triggering crash at point: {}", name);
        std::process::abort();
    }
}

/// All defined crash point names
pub mod points {
    // WAL append
    pub const WAL_BEFORE_APPEND: &str = "wal_before_append";
    /// Writes only the first half of the line, then aborts
    pub const WAL_PARTIAL_APPEND: &str = "wal_partial_append";
    pub const WAL_BEFORE_FSYNC: &str = "wal_before_fsync";
    pub const WAL_AFTER_FSYNC: &str = "wal_after_fsync";

    // Compaction
    pub const COMPACTION_START: &str = "compaction_start";
    pub const COMPACTION_AFTER_BLOCK_WRITE: &str = "compaction_after_block_write";

    // Atomic WAL rotation (temp-write, sync, rename)
    /// Writes a truncated staging file, then aborts
    pub const ROTATION_STAGING_PARTIAL: &str = "rotation_staging_partial";
    pub const ROTATION_BEFORE_SYNC: &str = "rotation_before_sync";
    pub const ROTATION_BEFORE_RENAME: &str = "rotation_before_rename";
    pub const ROTATION_AFTER_RENAME: &str = "rotation_after_rename";

    // Recovery
    pub const RECOVERY_START: &str = "recovery_start";
    pub const RECOVERY_AFTER_REPAIR: &str = "recovery_after_repair";

    /// Get all crash point names
    pub fn all() -> &'static [&'static str] {
        &[
            WAL_BEFORE_APPEND,
            WAL_PARTIAL_APPEND,
            WAL_BEFORE_FSYNC,
            WAL_AFTER_FSYNC,
            COMPACTION_START,
            COMPACTION_AFTER_BLOCK_WRITE,
            ROTATION_STAGING_PARTIAL,
            ROTATION_BEFORE_SYNC,
            ROTATION_BEFORE_RENAME,
            ROTATION_AFTER_RENAME,
            RECOVERY_START,
            RECOVERY_AFTER_REPAIR,
        ]
    }
}
