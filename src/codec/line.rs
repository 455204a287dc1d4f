//! Textual WAL line format
//!
//! ```text
//! PUT <id> <value>
//! DEPOSIT <id> <value>
//! WITHDRAW <id> <value>
//! TRANSFER <fromId> <toId> <value>
//! ```
//!
//! Fields are whitespace-separated. Lines are returned and accepted without
//! the terminating newline; framing is the WAL's job.

use super::errors::{CodecError, CodecResult};
use crate::ledger::{Transaction, TransactionKind};

/// Encodes a transaction as a single log line (no terminator).
pub fn encode_line(tx: &Transaction) -> String {
    let keyword = tx.kind().keyword();
    match tx {
        Transaction::Put { account, value }
        | Transaction::Deposit { account, value }
        | Transaction::Withdraw { account, value } => {
            format!("{} {} {}", keyword, account, value)
        }
        Transaction::Transfer { from, to, value } => {
            format!("{} {} {} {}", keyword, from, to, value)
        }
    }
}

/// Decodes a single log line into a transaction.
pub fn decode_line(line: &str) -> CodecResult<Transaction> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let keyword = *fields.first().ok_or(CodecError::EmptyLine)?;
    let kind = TransactionKind::from_keyword(keyword)
        .ok_or_else(|| CodecError::UnknownKeyword(keyword.to_string()))?;

    if fields.len() != kind.field_count() {
        return Err(CodecError::FieldCount {
            keyword: kind.keyword(),
            expected: kind.field_count(),
            actual: fields.len(),
        });
    }

    let tx = match kind {
        TransactionKind::Put => Transaction::put(fields[1], parse_value(fields[2])?),
        TransactionKind::Deposit => Transaction::deposit(fields[1], parse_value(fields[2])?),
        TransactionKind::Withdraw => Transaction::withdraw(fields[1], parse_value(fields[2])?),
        TransactionKind::Transfer => {
            Transaction::transfer(fields[1], fields[2], parse_value(fields[3])?)
        }
    };
    Ok(tx)
}

/// Encodes the WAL pointer line (no terminator).
pub fn encode_pointer(next_block_id: u64) -> String {
    next_block_id.to_string()
}

/// Decodes the WAL pointer line. Block ids start at 1.
pub fn decode_pointer(line: &str) -> CodecResult<u64> {
    let trimmed = line.trim();
    match trimmed.parse::<u64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(CodecError::InvalidPointer(trimmed.to_string())),
    }
}

fn parse_value(field: &str) -> CodecResult<i64> {
    field
        .parse::<i64>()
        .map_err(|_| CodecError::InvalidValue(field.to_string()))
}
