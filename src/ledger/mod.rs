//! Ledger state subsystem
//!
//! Transactions and the in-memory balance reducer. Nothing in this module
//! touches the filesystem.

mod errors;
mod state;
mod transaction;

pub use errors::{LedgerError, LedgerErrorCode, LedgerResult};
pub use state::{is_valid_account, Balances};
pub use transaction::{Transaction, TransactionKind};
