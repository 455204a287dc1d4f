//! Crash test harness for subprocess management
//!
//! This harness:
//! - Starts the `blockledger` binary as a subprocess
//! - Injects crashes via `BLOCKLEDGER_CRASH_POINT`
//! - Validates post-crash state by opening the store in-process

use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use blockledger::crash_point::CRASH_POINT_ENV;
use blockledger::{LedgerConfig, LedgerStore};
use serde_json::Value;

/// Path of the binary under test
pub const BIN: &str = env!("CARGO_BIN_EXE_blockledger");

/// Result of a crash test execution
#[derive(Debug)]
pub struct CrashTestResult {
    /// Whether the process ended abnormally
    pub crashed: bool,
    /// Exit status if available
    pub exit_status: Option<ExitStatus>,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
}

impl CrashTestResult {
    /// Response lines written before the process ended
    pub fn responses(&self) -> Vec<Value> {
        self.stdout
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Number of requests answered with `"status": "ok"`
    pub fn acknowledged(&self) -> usize {
        self.responses()
            .iter()
            .filter(|r| r["status"] == "ok")
            .count()
    }
}

/// Run a CLI command, optionally with a crash point enabled
///
/// `requests` are written to stdin one per line, then stdin is closed.
pub fn execute_with_crash_point(
    crash_point: Option<&str>,
    command: &str,
    config_path: &Path,
    requests: &[String],
) -> CrashTestResult {
    let mut cmd = Command::new(BIN);
    cmd.arg(command)
        .arg("--config")
        .arg(config_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    match crash_point {
        Some(point) => cmd.env(CRASH_POINT_ENV, point),
        None => cmd.env_remove(CRASH_POINT_ENV),
    };

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return CrashTestResult {
                crashed: true,
                exit_status: None,
                stdout: String::new(),
                stderr: format!("Failed to execute: {}", e),
            }
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        for request in requests {
            // The child may already be gone; a broken pipe is expected then
            if writeln!(stdin, "{}", request).is_err() {
                break;
            }
        }
    }

    match child.wait_with_output() {
        Ok(output) => CrashTestResult {
            crashed: !output.status.success(),
            exit_status: Some(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        },
        Err(e) => CrashTestResult {
            crashed: true,
            exit_status: None,
            stdout: String::new(),
            stderr: format!("Failed to wait: {}", e),
        },
    }
}

/// Initialize the data directory without any crash point
pub fn init_data_dir(config_path: &Path) {
    let result = execute_with_crash_point(None, "init", config_path, &[]);
    assert!(
        !result.crashed,
        "init failed: {} {}",
        result.stdout, result.stderr
    );
}

/// Serve `requests` with `crash_point` enabled
pub fn run_with_crash_point(
    crash_point: &str,
    config_path: &Path,
    requests: &[String],
) -> CrashTestResult {
    execute_with_crash_point(Some(crash_point), "start", config_path, requests)
}

/// Validate that the data directory recovers to a consistent state
///
/// Opens the store (running recovery) and checks the clean layout:
/// no staging file, no temp blocks, a full block for every id below the
/// pointer and fewer than N pending records.
pub fn validate_post_crash_state(
    data_dir: &Path,
    block_size: usize,
) -> Result<LedgerStore, Vec<String>> {
    let store = match LedgerStore::open(LedgerConfig::new(data_dir, block_size).quiet()) {
        Ok(store) => store,
        Err(e) => return Err(vec![format!("Recovery failed: {}", e)]),
    };

    let mut errors = Vec::new();

    if data_dir.join("log_.txt").exists() {
        errors.push("Staging file survived recovery".to_string());
    }

    if let Err(e) = super::utils::validate_no_partial_files(data_dir) {
        errors.push(format!("Partial files: {}", e));
    }

    if let Err(e) = super::utils::validate_block_files(data_dir, store.next_block_id(), block_size)
    {
        errors.push(format!("Blocks: {}", e));
    }

    if store.pending_record_count() >= block_size {
        errors.push(format!(
            "{} records pending after recovery, block size {}",
            store.pending_record_count(),
            block_size
        ));
    }

    if errors.is_empty() {
        Ok(store)
    } else {
        Err(errors)
    }
}

/// Report crash test failure
pub fn report_failure(
    crash_point: &str,
    operation: &str,
    expected: &str,
    actual: &str,
    logs: &str,
) {
    eprintln!("=== CRASH TEST FAILURE ===");
    eprintln!("Crash point: {}", crash_point);
    eprintln!("Operation: {}", operation);
    eprintln!("Expected: {}", expected);
    eprintln!("Actual: {}", actual);
    eprintln!("Process logs:\n{}", logs);
    eprintln!("==========================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crash::utils::{create_temp_data_dir, write_config};

    #[test]
    fn test_validate_post_crash_state_fresh_dir() {
        let temp_dir = create_temp_data_dir("harness_test");
        let data_dir = temp_dir.path().join("data");

        let store = validate_post_crash_state(&data_dir, 2).unwrap();
        assert_eq!(store.next_block_id(), 1);
    }

    #[test]
    fn test_start_without_crash_point_serves() {
        let temp_dir = create_temp_data_dir("harness_serve");
        let config_path = write_config(temp_dir.path(), 2);
        init_data_dir(&config_path);

        let requests = vec![
            r#"{"op":"put","user_id":"alice","value":7}"#.to_string(),
            r#"{"op":"get","user_id":"alice"}"#.to_string(),
            "not json".to_string(),
        ];
        let result = execute_with_crash_point(None, "start", &config_path, &requests);

        assert!(!result.crashed, "{}", result.stderr);
        let responses = result.responses();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[1]["data"]["balance"], 7);
        assert_eq!(responses[2]["code"], "LEDGER_INVALID_REQUEST");
    }
}
