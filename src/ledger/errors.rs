//! Ledger validation errors
//!
//! Error codes:
//! - LEDGER_NEGATIVE_VALUE (ERROR severity)
//! - LEDGER_INSUFFICIENT_BALANCE (ERROR severity)
//! - LEDGER_INVALID_ACCOUNT (ERROR severity)
//! - LEDGER_BALANCE_OVERFLOW (ERROR severity)
//!
//! Validation errors never mutate state. During recovery the same errors
//! are escalated to database corruption by the recovery controller.

use std::fmt;

/// Severity levels for ledger errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation rejected, store continues serving
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Ledger validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerErrorCode {
    /// Transaction value is below zero
    NegativeValue,
    /// Source account cannot cover the debit
    InsufficientBalance,
    /// Account id is empty or contains whitespace
    InvalidAccount,
    /// Resulting balance does not fit in an i64
    BalanceOverflow,
}

impl LedgerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            LedgerErrorCode::NegativeValue => "LEDGER_NEGATIVE_VALUE",
            LedgerErrorCode::InsufficientBalance => "LEDGER_INSUFFICIENT_BALANCE",
            LedgerErrorCode::InvalidAccount => "LEDGER_INVALID_ACCOUNT",
            LedgerErrorCode::BalanceOverflow => "LEDGER_BALANCE_OVERFLOW",
        }
    }

    /// All validation failures are recoverable
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for LedgerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Ledger validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerError {
    code: LedgerErrorCode,
    message: String,
}

impl LedgerError {
    /// Value was negative
    pub fn negative_value(value: i64) -> Self {
        Self {
            code: LedgerErrorCode::NegativeValue,
            message: format!("value must be non-negative, got {}", value),
        }
    }

    /// Debit would drive the account below zero
    pub fn insufficient_balance(account: &str, balance: i64, value: i64) -> Self {
        Self {
            code: LedgerErrorCode::InsufficientBalance,
            message: format!(
                "account '{}' has balance {}, cannot debit {}",
                account, balance, value
            ),
        }
    }

    /// Account id cannot be represented in the log format
    pub fn invalid_account(account: &str) -> Self {
        Self {
            code: LedgerErrorCode::InvalidAccount,
            message: format!("invalid account id '{}'", account),
        }
    }

    /// Credit would overflow the balance
    pub fn balance_overflow(account: &str) -> Self {
        Self {
            code: LedgerErrorCode::BalanceOverflow,
            message: format!("balance of account '{}' would overflow", account),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> LedgerErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Ledger errors are never fatal on their own
    pub fn is_fatal(&self) -> bool {
        false
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for LedgerError {}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
