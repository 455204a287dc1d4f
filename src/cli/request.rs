//! Request types for the serving loop
//!
//! ```json
//! {"op":"get","user_id":"alice"}
//! {"op":"put","user_id":"alice","value":100}
//! {"op":"transfer","from_id":"alice","to_id":"bob","value":5}
//! {"op":"pending"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::store::{LedgerStore, StoreError};

/// Code reported for lines that are not a valid request
pub const INVALID_REQUEST: &str = "LEDGER_INVALID_REQUEST";

/// One request line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    Get { user_id: String },
    Put { user_id: String, value: i64 },
    Deposit { user_id: String, value: i64 },
    Withdraw { user_id: String, value: i64 },
    Transfer { from_id: String, to_id: String, value: i64 },
    Pending,
}

impl Request {
    /// Parse a request line
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Executes a request against the store, returning the response data.
///
/// Mutations answer with the balances they touched.
pub fn handle(store: &mut LedgerStore, request: &Request) -> Result<Value, StoreError> {
    match request {
        Request::Get { user_id } => Ok(json!({
            "user_id": user_id,
            "balance": store.get(user_id),
        })),
        Request::Put { user_id, value } => {
            store.try_put(user_id, *value)?;
            Ok(balance_of(store, user_id))
        }
        Request::Deposit { user_id, value } => {
            store.try_deposit(user_id, *value)?;
            Ok(balance_of(store, user_id))
        }
        Request::Withdraw { user_id, value } => {
            store.try_withdraw(user_id, *value)?;
            Ok(balance_of(store, user_id))
        }
        Request::Transfer {
            from_id,
            to_id,
            value,
        } => {
            store.try_transfer(from_id, to_id, *value)?;
            Ok(json!({
                "from_id": from_id,
                "from_balance": store.get(from_id),
                "to_id": to_id,
                "to_balance": store.get(to_id),
            }))
        }
        Request::Pending => Ok(json!({
            "pending": store.pending_record_count(),
            "next_block_id": store.next_block_id(),
        })),
    }
}

fn balance_of(store: &LedgerStore, user_id: &str) -> Value {
    json!({
        "user_id": user_id,
        "balance": store.get(user_id),
    })
}
