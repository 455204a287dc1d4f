//! Recovery subsystem
//!
//! Recovery runs once when a store is opened, before any operation is
//! accepted. It collapses every transient on-disk layout left by a crash
//! into the single clean layout (live WAL only, no staging file, no block
//! file at the pointer id), then rebuilds balances from blocks and WAL.
//!
//! # Guarantees
//!
//! - Block files and the WAL pointer are the only durable truth
//! - Replay is sequential and validates every transaction
//! - A torn final WAL line is cut off; any other inconsistency is FATAL
//! - Recovery is idempotent

mod errors;
mod replay;
mod startup;

pub use errors::{RecoveryError, RecoveryErrorCode, RecoveryResult, Severity};
pub use replay::{BlockReplayStats, BlockReplayer, WalReplayStats, WalReplayer};
pub use startup::{RecoveredState, RecoveryManager, RecoveryReport};
