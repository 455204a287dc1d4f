//! Observable events
//!
//! Events are explicit and typed. The string form is what appears in the
//! `event` key of a log line.

use std::fmt;

use super::logger::Severity;

/// Observable events in the ledger store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Store opened and ready to serve
    StoreOpened,
    /// Store stopped accepting writes after a fatal error
    StoreHalted,

    // WAL
    /// A fresh WAL was created
    WalCreated,
    /// A torn final WAL line was cut off
    WalTornTailTruncated,
    /// A WAL append failed; the operation was rejected
    WalAppendFailed,

    // Compaction
    /// Block written and WAL rotated
    CompactionComplete,
    /// Compaction failed; records stay in the WAL
    CompactionFailed,

    // Recovery
    /// Recovery started
    RecoveryStart,
    /// Leftover staging file found and discarded
    RecoveryStagingFound,
    /// Block file at the pointer id found; compaction is re-run
    RecoveryStaleBlockFound,
    /// Recovery finished, state rebuilt
    RecoveryComplete,
    /// Recovery aborted (FATAL)
    RecoveryFailed,
}

impl Event {
    /// Returns the event name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreHalted => "STORE_HALTED",
            Event::WalCreated => "WAL_CREATED",
            Event::WalTornTailTruncated => "WAL_TORN_TAIL_TRUNCATED",
            Event::WalAppendFailed => "WAL_APPEND_FAILED",
            Event::CompactionComplete => "COMPACTION_COMPLETE",
            Event::CompactionFailed => "COMPACTION_FAILED",
            Event::RecoveryStart => "RECOVERY_START",
            Event::RecoveryStagingFound => "RECOVERY_STAGING_FOUND",
            Event::RecoveryStaleBlockFound => "RECOVERY_STALE_BLOCK_FOUND",
            Event::RecoveryComplete => "RECOVERY_COMPLETE",
            Event::RecoveryFailed => "RECOVERY_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::StoreHalted | Event::RecoveryFailed => Severity::Fatal,
            Event::WalAppendFailed | Event::CompactionFailed => Severity::Error,
            Event::WalTornTailTruncated
            | Event::RecoveryStagingFound
            | Event::RecoveryStaleBlockFound => Severity::Warn,
            _ => Severity::Info,
        }
    }

    /// Returns whether this event ends serving
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
