//! Ledger store
//!
//! `LedgerStore` owns one data directory: it holds the directory lock, the
//! WAL writer, the compactor and the in-memory balances. There is no
//! process-wide instance; callers construct a store with
//! `LedgerStore::open` and drop it to release the directory.

mod engine;
mod errors;
mod lock;

pub use engine::LedgerStore;
pub use errors::{Severity, StoreError, StoreResult};
pub use lock::{DirectoryLock, LockError, LOCK_FILE};
