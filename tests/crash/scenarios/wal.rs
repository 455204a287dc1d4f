//! WAL crash test scenarios
//!
//! - Crash before the line is written: operation lost
//! - Crash mid-line: torn tail cut off on restart, operation lost
//! - Crash after fsync: operation preserved even though never acknowledged

use crate::crash::harness::{
    init_data_dir, report_failure, run_with_crash_point, validate_post_crash_state,
};
use crate::crash::utils::{
    create_temp_data_dir, expected_after, read_wal_contents, request_for, write_config,
};
use blockledger::crash_point::points;
use blockledger::Transaction;

/// Serve `put alice 100` then `deposit alice 5` with `point` armed.
///
/// The first append hits the crash point, so nothing is acknowledged.
fn crash_on_first_append(point: &str) -> (tempfile::TempDir, blockledger::LedgerStore) {
    let temp_dir = create_temp_data_dir(point);
    let config_path = write_config(temp_dir.path(), 2);
    init_data_dir(&config_path);

    let requests = vec![
        request_for(&Transaction::put("alice", 100)),
        request_for(&Transaction::deposit("alice", 5)),
    ];
    let result = run_with_crash_point(point, &config_path, &requests);
    assert!(result.crashed, "process did not crash at {}", point);
    assert_eq!(result.acknowledged(), 0);

    let data_dir = temp_dir.path().join("data");
    match validate_post_crash_state(&data_dir, 2) {
        Ok(store) => (temp_dir, store),
        Err(errors) => {
            report_failure(point, "put", "clean layout", &errors.join("; "), &result.stderr);
            panic!("post-crash validation failed at {}", point);
        }
    }
}

/// Test: a record not yet written is lost
#[test]
fn test_wal_crash_before_append_loses_record() {
    let (temp_dir, store) = crash_on_first_append(points::WAL_BEFORE_APPEND);

    assert_eq!(store.get("alice"), 0);
    assert_eq!(store.pending_record_count(), 0);
    assert_eq!(read_wal_contents(&temp_dir.path().join("data")), "1\n");
}

/// Test: half a line is treated as a torn write and removed
#[test]
fn test_wal_partial_append_truncated() {
    let (temp_dir, store) = crash_on_first_append(points::WAL_PARTIAL_APPEND);

    assert_eq!(store.get("alice"), 0);
    assert_eq!(store.pending_record_count(), 0);
    assert!(store.recovery_report().torn_bytes_truncated > 0);
    assert_eq!(read_wal_contents(&temp_dir.path().join("data")), "1\n");
}

/// Test: a written but unsynced record is either fully there or gone
#[test]
fn test_wal_crash_before_fsync_all_or_nothing() {
    let (_temp_dir, store) = crash_on_first_append(points::WAL_BEFORE_FSYNC);

    let alice = store.get("alice");
    assert!(alice == 0 || alice == 100, "alice = {}", alice);
    assert_eq!(store.pending_record_count(), if alice == 0 { 0 } else { 1 });
}

/// Test: an fsynced record survives even though no response was sent
#[test]
fn test_wal_crash_after_fsync_preserves_record() {
    let (temp_dir, store) = crash_on_first_append(points::WAL_AFTER_FSYNC);

    assert_eq!(store.balances(), &expected_after(&[Transaction::put("alice", 100)], 1));
    assert_eq!(store.pending_record_count(), 1);
    assert_eq!(
        read_wal_contents(&temp_dir.path().join("data")),
        "1\nPUT alice 100\n"
    );
}

/// Test: WAL crash point names are valid
#[test]
fn test_wal_crash_points_defined() {
    assert_eq!(points::WAL_BEFORE_APPEND, "wal_before_append");
    assert_eq!(points::WAL_PARTIAL_APPEND, "wal_partial_append");
    assert_eq!(points::WAL_BEFORE_FSYNC, "wal_before_fsync");
    assert_eq!(points::WAL_AFTER_FSYNC, "wal_after_fsync");
}
