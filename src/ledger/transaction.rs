//! Ledger transactions
//!
//! A transaction is the unit recorded in the WAL and folded into blocks.
//! The serde representation is the structured block form:
//!
//! ```json
//! {"Type":"PUT","UserID":"alice","Value":100}
//! {"Type":"TRANSFER","FromID":"alice","ToID":"bob","Value":5}
//! ```
//!
//! `Value` defaults to 0 when absent, matching protobuf JSON printers that
//! omit zero-valued fields.

use serde::{Deserialize, Serialize};

/// Transaction kind, named by the leading keyword of a WAL line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Put,
    Deposit,
    Withdraw,
    Transfer,
}

impl TransactionKind {
    /// Returns the keyword used in the WAL line format
    pub fn keyword(&self) -> &'static str {
        match self {
            TransactionKind::Put => "PUT",
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdraw => "WITHDRAW",
            TransactionKind::Transfer => "TRANSFER",
        }
    }

    /// Parses a WAL line keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "PUT" => Some(TransactionKind::Put),
            "DEPOSIT" => Some(TransactionKind::Deposit),
            "WITHDRAW" => Some(TransactionKind::Withdraw),
            "TRANSFER" => Some(TransactionKind::Transfer),
            _ => None,
        }
    }

    /// Number of whitespace-separated fields in a WAL line, keyword included
    pub fn field_count(&self) -> usize {
        match self {
            TransactionKind::Transfer => 4,
            _ => 3,
        }
    }
}

/// A single ledger transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type", rename_all = "UPPERCASE")]
pub enum Transaction {
    /// Unconditionally set a balance
    Put {
        #[serde(rename = "UserID")]
        account: String,
        #[serde(rename = "Value", default)]
        value: i64,
    },
    /// Add to a balance
    Deposit {
        #[serde(rename = "UserID")]
        account: String,
        #[serde(rename = "Value", default)]
        value: i64,
    },
    /// Subtract from a balance
    Withdraw {
        #[serde(rename = "UserID")]
        account: String,
        #[serde(rename = "Value", default)]
        value: i64,
    },
    /// Move value between two accounts
    Transfer {
        #[serde(rename = "FromID")]
        from: String,
        #[serde(rename = "ToID")]
        to: String,
        #[serde(rename = "Value", default)]
        value: i64,
    },
}

impl Transaction {
    pub fn put(account: impl Into<String>, value: i64) -> Self {
        Transaction::Put {
            account: account.into(),
            value,
        }
    }

    pub fn deposit(account: impl Into<String>, value: i64) -> Self {
        Transaction::Deposit {
            account: account.into(),
            value,
        }
    }

    pub fn withdraw(account: impl Into<String>, value: i64) -> Self {
        Transaction::Withdraw {
            account: account.into(),
            value,
        }
    }

    pub fn transfer(from: impl Into<String>, to: impl Into<String>, value: i64) -> Self {
        Transaction::Transfer {
            from: from.into(),
            to: to.into(),
            value,
        }
    }

    /// Returns the transaction kind
    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Put { .. } => TransactionKind::Put,
            Transaction::Deposit { .. } => TransactionKind::Deposit,
            Transaction::Withdraw { .. } => TransactionKind::Withdraw,
            Transaction::Transfer { .. } => TransactionKind::Transfer,
        }
    }

    /// Returns the transaction value
    pub fn value(&self) -> i64 {
        match self {
            Transaction::Put { value, .. }
            | Transaction::Deposit { value, .. }
            | Transaction::Withdraw { value, .. }
            | Transaction::Transfer { value, .. } => *value,
        }
    }

    /// Returns every account id the transaction touches
    pub fn accounts(&self) -> Vec<&str> {
        match self {
            Transaction::Put { account, .. }
            | Transaction::Deposit { account, .. }
            | Transaction::Withdraw { account, .. } => vec![account.as_str()],
            Transaction::Transfer { from, to, .. } => vec![from.as_str(), to.as_str()],
        }
    }
}
