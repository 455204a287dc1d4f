//! Crash testing utilities
//!
//! These utilities support:
//! - Creating temp directories and config files
//! - Building workloads and their expected outcomes
//! - Validating post-crash on-disk layout

use std::fs;
use std::path::{Path, PathBuf};

use blockledger::codec::Block;
use blockledger::{Balances, LedgerStore, Transaction};
use serde_json::json;
use tempfile::TempDir;

/// Create a temporary directory for crash testing
///
/// The store's data directory is `<temp>/data`.
pub fn create_temp_data_dir(prefix: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(&format!("blockledger_crash_test_{}_", prefix))
        .tempdir()
        .expect("Failed to create temp dir")
}

/// Write a config file pointing at `<root>/data`
pub fn write_config(root: &Path, block_size: usize) -> PathBuf {
    let config_path = root.join("blockledger.json");
    let config = json!({
        "data_dir": root.join("data").to_string_lossy(),
        "block_size": block_size,
    });
    fs::write(&config_path, config.to_string()).expect("Failed to write config");
    config_path
}

/// Encode a transaction as a request line
pub fn request_for(tx: &Transaction) -> String {
    let request = match tx {
        Transaction::Put { account, value } => {
            json!({"op": "put", "user_id": account, "value": value})
        }
        Transaction::Deposit { account, value } => {
            json!({"op": "deposit", "user_id": account, "value": value})
        }
        Transaction::Withdraw { account, value } => {
            json!({"op": "withdraw", "user_id": account, "value": value})
        }
        Transaction::Transfer { from, to, value } => {
            json!({"op": "transfer", "from_id": from, "to_id": to, "value": value})
        }
    };
    request.to_string()
}

/// Run a transaction through the store's boolean surface
pub fn apply_to_store(store: &mut LedgerStore, tx: &Transaction) -> bool {
    match tx {
        Transaction::Put { account, value } => store.put(account, *value),
        Transaction::Deposit { account, value } => store.deposit(account, *value),
        Transaction::Withdraw { account, value } => store.withdraw(account, *value),
        Transaction::Transfer { from, to, value } => store.transfer(from, to, *value),
    }
}

/// A workload that crosses two block boundaries at N=2
pub fn standard_workload() -> Vec<Transaction> {
    vec![
        Transaction::put("alice", 100),
        Transaction::deposit("alice", 50),
        Transaction::withdraw("alice", 20),
        Transaction::transfer("alice", "bob", 30),
        Transaction::deposit("bob", 5),
    ]
}

/// Balances after the first `count` transactions of `workload`
pub fn expected_after(workload: &[Transaction], count: usize) -> Balances {
    let mut balances = Balances::new();
    for tx in workload.iter().take(count) {
        balances
            .apply(tx)
            .expect("workload transactions must be valid");
    }
    balances
}

/// Validate no partial files exist
pub fn validate_no_partial_files(data_dir: &Path) -> Result<(), String> {
    if !data_dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(data_dir)
        .map_err(|e| format!("Cannot read dir {}: {}", data_dir.display(), e))?
    {
        let entry = entry.map_err(|e| format!("Cannot read entry: {}", e))?;
        let path = entry.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if name.ends_with(".tmp") {
            return Err(format!("Partial file found: {}", path.display()));
        }
    }

    Ok(())
}

/// Validate that blocks `1..next_block_id` exist and each holds N records
pub fn validate_block_files(
    data_dir: &Path,
    next_block_id: u64,
    block_size: usize,
) -> Result<(), String> {
    for id in 1..next_block_id {
        let path = data_dir.join(format!("{}.json", id));
        let json = fs::read_to_string(&path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        let block =
            Block::from_json(&json).map_err(|e| format!("Invalid {}: {}", path.display(), e))?;

        if block.block_id != id {
            return Err(format!("{} has BlockID {}", path.display(), block.block_id));
        }
        if block.transactions.len() != block_size {
            return Err(format!(
                "{} holds {} records, expected {}",
                path.display(),
                block.transactions.len(),
                block_size
            ));
        }
    }

    Ok(())
}

/// Read the live WAL as text
pub fn read_wal_contents(data_dir: &Path) -> String {
    fs::read_to_string(data_dir.join("log.txt")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_create_temp_data_dir() {
        let temp_dir = create_temp_data_dir("test");
        assert!(temp_dir.path().exists());
    }

    #[test]
    fn test_validate_no_partial_files() {
        let temp_dir = create_temp_data_dir("partial_test");
        let data_dir = temp_dir.path();

        assert!(validate_no_partial_files(data_dir).is_ok());

        File::create(data_dir.join("3.json.tmp")).unwrap();
        assert!(validate_no_partial_files(data_dir).is_err());
    }

    #[test]
    fn test_expected_after_prefixes() {
        let workload = standard_workload();
        assert_eq!(expected_after(&workload, 0).get("alice"), 0);
        assert_eq!(expected_after(&workload, 2).get("alice"), 150);
        assert_eq!(expected_after(&workload, 5).get("bob"), 35);
    }

    #[test]
    fn test_request_for_parses() {
        let line = request_for(&Transaction::transfer("a", "b", 3));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["op"], "transfer");
        assert_eq!(value["from_id"], "a");
    }
}
