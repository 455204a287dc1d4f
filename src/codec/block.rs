//! Structured block record
//!
//! A block is the JSON document written to `<id>.json` when the WAL is
//! compacted:
//!
//! ```json
//! {
//!   "BlockID": 1,
//!   "PrevHash": "00000000",
//!   "Transactions": [{"Type":"PUT","UserID":"alice","Value":100}],
//!   "Nonce": "00000000"
//! }
//! ```
//!
//! `PrevHash` and `Nonce` are placeholders kept for format compatibility.
//! They are written but never verified.

use serde::{Deserialize, Serialize};

use super::errors::{CodecError, CodecResult};
use crate::ledger::Transaction;

/// Value written to the unverified metadata fields
pub const PLACEHOLDER: &str = "00000000";

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

/// An immutable batch of exactly N transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "BlockID")]
    pub block_id: u64,

    #[serde(rename = "PrevHash", default = "placeholder")]
    pub prev_hash: String,

    #[serde(rename = "Transactions", default)]
    pub transactions: Vec<Transaction>,

    #[serde(rename = "Nonce", default = "placeholder")]
    pub nonce: String,
}

impl Block {
    /// Creates a block with placeholder metadata
    pub fn new(block_id: u64, transactions: Vec<Transaction>) -> Self {
        Self {
            block_id,
            prev_hash: placeholder(),
            transactions,
            nonce: placeholder(),
        }
    }

    /// Number of transactions in the block
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Serializes the block to pretty JSON
    pub fn to_json(&self) -> CodecResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CodecError::Json(e.to_string()))
    }

    /// Parses a block from JSON
    pub fn from_json(json: &str) -> CodecResult<Self> {
        serde_json::from_str(json).map_err(|e| CodecError::Json(e.to_string()))
    }
}

/// File name of a block: `<id>.json`
pub fn block_file_name(block_id: u64) -> String {
    format!("{}.json", block_id)
}
