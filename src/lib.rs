//! blockledger - a crash-consistent ledger store
//!
//! Account transactions are appended to a write-ahead log (`log.txt`) and
//! periodically compacted into immutable numbered block files
//! (`<id>.json`). Balances live in memory and are rebuilt from blocks plus
//! the WAL every time the store is opened.
//!
//! ```ignore
//! use blockledger::{LedgerConfig, LedgerStore};
//!
//! let mut store = LedgerStore::open(LedgerConfig::new("./data", 50))?;
//! store.put("alice", 100);
//! store.transfer("alice", "bob", 30);
//! assert_eq!(store.get("bob"), 30);
//! ```

pub mod cli;
pub mod codec;
pub mod compaction;
pub mod config;
pub mod crash_point;
pub mod ledger;
pub mod observability;
pub mod recovery;
pub mod store;
pub mod wal;

pub use config::LedgerConfig;
pub use ledger::{Balances, Transaction};
pub use store::{LedgerStore, StoreError, StoreResult};
