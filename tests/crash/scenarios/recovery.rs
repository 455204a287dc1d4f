//! Recovery crash test scenarios
//!
//! - A crash during recovery leaves a state recovery can still handle
//! - Same crash + same data → identical final state
//! - Every crash point converges to a prefix of the acknowledged history

use std::fs;

use crate::crash::harness::{
    execute_with_crash_point, init_data_dir, report_failure, run_with_crash_point,
    validate_post_crash_state,
};
use crate::crash::utils::{
    create_temp_data_dir, expected_after, read_wal_contents, request_for, standard_workload,
    write_config,
};
use blockledger::crash_point::points;

/// Test: a crash before recovery touches anything changes nothing
#[test]
fn test_crash_at_recovery_start() {
    let temp_dir = create_temp_data_dir("recovery_start");
    let config_path = write_config(temp_dir.path(), 2);
    init_data_dir(&config_path);

    let data_dir = temp_dir.path().join("data");
    fs::write(data_dir.join("log.txt"), "1\nPUT alice 10\nPUT bo").unwrap();

    let result = execute_with_crash_point(
        Some(points::RECOVERY_START),
        "status",
        &config_path,
        &[],
    );
    assert!(result.crashed);
    assert_eq!(read_wal_contents(&data_dir), "1\nPUT alice 10\nPUT bo");

    let store = validate_post_crash_state(&data_dir, 2).unwrap();
    assert_eq!(store.get("alice"), 10);
    assert_eq!(store.pending_record_count(), 1);
}

/// Test: a crash right after the torn tail was cut off is harmless
#[test]
fn test_crash_after_repair() {
    let temp_dir = create_temp_data_dir("recovery_after_repair");
    let config_path = write_config(temp_dir.path(), 2);
    init_data_dir(&config_path);

    let data_dir = temp_dir.path().join("data");
    fs::write(data_dir.join("log.txt"), "1\nPUT alice 10\nPUT bo").unwrap();

    let result = execute_with_crash_point(
        Some(points::RECOVERY_AFTER_REPAIR),
        "status",
        &config_path,
        &[],
    );
    assert!(result.crashed);
    assert_eq!(read_wal_contents(&data_dir), "1\nPUT alice 10\n");

    let store = validate_post_crash_state(&data_dir, 2).unwrap();
    assert_eq!(store.get("alice"), 10);
    assert!(!store.recovery_report().repaired());
}

/// Test: recovery that crashes in its own backlog compaction, repeatedly
#[test]
fn test_repeated_crash_during_backlog_compaction() {
    let temp_dir = create_temp_data_dir("recovery_backlog");
    let config_path = write_config(temp_dir.path(), 2);
    init_data_dir(&config_path);

    let data_dir = temp_dir.path().join("data");
    fs::write(
        data_dir.join("log.txt"),
        "1\nPUT a 1\nPUT b 2\nPUT c 3\nPUT d 4\nPUT e 5\n",
    )
    .unwrap();

    for _ in 0..3 {
        let result = execute_with_crash_point(
            Some(points::ROTATION_BEFORE_RENAME),
            "status",
            &config_path,
            &[],
        );
        assert!(result.crashed);
    }

    let store = validate_post_crash_state(&data_dir, 2).unwrap();
    assert_eq!(store.next_block_id(), 3);
    assert_eq!(store.pending_record_count(), 1);
    for (account, balance) in [("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)] {
        assert_eq!(store.get(account), balance);
    }
    assert_eq!(read_wal_contents(&data_dir), "3\nPUT e 5\n");
}

/// Test: every crash point converges, never losing an acknowledged write
#[test]
fn test_every_crash_point_converges() {
    let workload = standard_workload();
    let requests: Vec<String> = workload.iter().map(request_for).collect();

    for point in points::all() {
        let temp_dir = create_temp_data_dir(point);
        let config_path = write_config(temp_dir.path(), 2);
        init_data_dir(&config_path);

        let result = run_with_crash_point(point, &config_path, &requests);
        let acked = result.acknowledged();

        let data_dir = temp_dir.path().join("data");
        let store = match validate_post_crash_state(&data_dir, 2) {
            Ok(store) => store,
            Err(errors) => {
                report_failure(point, "workload", "clean layout", &errors.join("; "), &result.stderr);
                panic!("post-crash validation failed at {}", point);
            }
        };

        // The in-flight operation may or may not have become durable
        let candidates = [acked, (acked + 1).min(workload.len())];
        let matched = candidates
            .iter()
            .any(|&count| store.balances() == &expected_after(&workload, count));
        if !matched {
            report_failure(
                point,
                "workload",
                &format!("state after {} or {} operations", candidates[0], candidates[1]),
                &format!("{:?}", store.balances()),
                &result.stderr,
            );
            panic!("state diverged at {}", point);
        }
    }
}

/// Test: the same crash on the same data ends in the same state
#[test]
fn test_recovery_deterministic() {
    let workload = standard_workload();
    let requests: Vec<String> = workload.iter().map(request_for).collect();

    let mut outcomes = Vec::new();
    for run in 0..2 {
        let temp_dir = create_temp_data_dir(&format!("deterministic_{}", run));
        let config_path = write_config(temp_dir.path(), 2);
        init_data_dir(&config_path);

        let result =
            run_with_crash_point(points::COMPACTION_AFTER_BLOCK_WRITE, &config_path, &requests);
        assert!(result.crashed);

        let data_dir = temp_dir.path().join("data");
        let store = validate_post_crash_state(&data_dir, 2).unwrap();
        outcomes.push((
            store.balances().clone(),
            store.next_block_id(),
            store.pending_record_count(),
            read_wal_contents(&data_dir),
        ));
    }

    assert_eq!(outcomes[0], outcomes[1]);
}
