//! Compaction and rotation crash scenarios
//!
//! With N=2 the second mutation triggers compaction. Whatever step the
//! process dies in (block write, staging write, sync, rename), restart
//! must converge to block 1 holding both records and pointer 2.

use crate::crash::harness::{
    init_data_dir, report_failure, run_with_crash_point, validate_post_crash_state,
};
use crate::crash::utils::{
    apply_to_store, create_temp_data_dir, expected_after, read_wal_contents, request_for,
    standard_workload, write_config,
};
use blockledger::crash_point::points;

const COMPACTION_POINTS: &[&str] = &[
    points::COMPACTION_START,
    points::COMPACTION_AFTER_BLOCK_WRITE,
    points::ROTATION_STAGING_PARTIAL,
    points::ROTATION_BEFORE_SYNC,
    points::ROTATION_BEFORE_RENAME,
    points::ROTATION_AFTER_RENAME,
];

fn crash_during_first_compaction(point: &str) {
    let temp_dir = create_temp_data_dir(point);
    let config_path = write_config(temp_dir.path(), 2);
    init_data_dir(&config_path);

    let workload = standard_workload();
    let requests: Vec<String> = workload.iter().map(request_for).collect();
    let result = run_with_crash_point(point, &config_path, &requests);

    assert!(result.crashed, "process did not crash at {}", point);
    // The second append is durable, its compaction is what crashed
    assert_eq!(result.acknowledged(), 1);

    let data_dir = temp_dir.path().join("data");
    let store = match validate_post_crash_state(&data_dir, 2) {
        Ok(store) => store,
        Err(errors) => {
            report_failure(point, "compaction", "clean layout", &errors.join("; "), &result.stderr);
            panic!("post-crash validation failed at {}", point);
        }
    };

    assert_eq!(store.next_block_id(), 2, "pointer after crash at {}", point);
    assert_eq!(store.pending_record_count(), 0);
    assert_eq!(store.balances(), &expected_after(&workload, 2));
    assert_eq!(read_wal_contents(&data_dir), "2\n");
}

/// Test: compaction converges from every crash point
#[test]
fn test_compaction_crash_points_converge() {
    for point in COMPACTION_POINTS {
        crash_during_first_compaction(point);
    }
}

/// Test: the store keeps working after a crashed compaction
#[test]
fn test_writes_continue_after_crashed_rotation() {
    let temp_dir = create_temp_data_dir("after_rotation");
    let config_path = write_config(temp_dir.path(), 2);
    init_data_dir(&config_path);

    let workload = standard_workload();
    let requests: Vec<String> = workload.iter().map(request_for).collect();
    let result = run_with_crash_point(points::ROTATION_BEFORE_RENAME, &config_path, &requests);
    assert!(result.crashed);

    let data_dir = temp_dir.path().join("data");
    {
        let mut store = validate_post_crash_state(&data_dir, 2).unwrap();
        for tx in &workload[2..] {
            assert!(apply_to_store(&mut store, tx));
        }
    }

    let store = validate_post_crash_state(&data_dir, 2).unwrap();
    assert_eq!(store.balances(), &expected_after(&workload, workload.len()));
    assert_eq!(store.next_block_id(), 3);
    assert_eq!(store.pending_record_count(), 1);
}
