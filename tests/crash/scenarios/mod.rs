//! Crash scenarios, one file per subsystem

mod compaction;
mod recovery;
mod wal;
