//! In-memory ledger state
//!
//! `Balances` is a pure reducer over transactions. It is rebuilt on every
//! startup by replaying blocks and the WAL, and mutated afterwards only
//! once a transaction is durable in the WAL.
//!
//! Validation and application share one code path (`effects`), so a
//! transaction accepted by `validate` is guaranteed to `apply` cleanly
//! against the same state. The WAL therefore never records a transaction
//! that replay would reject.

use std::collections::HashMap;

use super::errors::{LedgerError, LedgerResult};
use super::transaction::Transaction;

/// Returns whether an account id can be written to the line format.
///
/// Ids are whitespace-delimited in the WAL, so they must be non-empty and
/// free of whitespace.
pub fn is_valid_account(account: &str) -> bool {
    !account.is_empty() && !account.chars().any(char::is_whitespace)
}

/// Account balances keyed by account id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    accounts: HashMap<String, i64>,
}

impl Balances {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the balance of an account, 0 if the account is unknown
    pub fn get(&self, account: &str) -> i64 {
        self.accounts.get(account).copied().unwrap_or(0)
    }

    /// Number of accounts that have ever been written
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterates over all known accounts
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.accounts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Checks a transaction against the current balances without mutating.
    pub fn validate(&self, tx: &Transaction) -> LedgerResult<()> {
        self.effects(tx).map(|_| ())
    }

    /// Applies a transaction.
    ///
    /// On error nothing is mutated; a transfer never leaves a partial effect.
    pub fn apply(&mut self, tx: &Transaction) -> LedgerResult<()> {
        for (account, balance) in self.effects(tx)? {
            self.accounts.insert(account, balance);
        }
        Ok(())
    }

    /// Computes the new balances a transaction would produce.
    fn effects(&self, tx: &Transaction) -> LedgerResult<Vec<(String, i64)>> {
        let value = tx.value();
        if value < 0 {
            return Err(LedgerError::negative_value(value));
        }
        for account in tx.accounts() {
            if !is_valid_account(account) {
                return Err(LedgerError::invalid_account(account));
            }
        }

        match tx {
            Transaction::Put { account, .. } => Ok(vec![(account.clone(), value)]),
            Transaction::Deposit { account, .. } => {
                let balance = self
                    .get(account)
                    .checked_add(value)
                    .ok_or_else(|| LedgerError::balance_overflow(account))?;
                Ok(vec![(account.clone(), balance)])
            }
            Transaction::Withdraw { account, .. } => {
                let current = self.get(account);
                if current < value {
                    return Err(LedgerError::insufficient_balance(account, current, value));
                }
                Ok(vec![(account.clone(), current - value)])
            }
            Transaction::Transfer { from, to, .. } => {
                let from_balance = self.get(from);
                if from_balance < value {
                    return Err(LedgerError::insufficient_balance(from, from_balance, value));
                }
                if from == to {
                    return Ok(vec![(from.clone(), from_balance)]);
                }
                let to_balance = self
                    .get(to)
                    .checked_add(value)
                    .ok_or_else(|| LedgerError::balance_overflow(to))?;
                Ok(vec![
                    (from.clone(), from_balance - value),
                    (to.clone(), to_balance),
                ])
            }
        }
    }
}
