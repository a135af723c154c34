//! # Progress Monitor Unit Tests / 进度监视器单元测试
//!
//! Tests for the derived execution snapshot and the monitor task's
//! termination behavior.
//!
//! 派生执行快照和监视器任务终止行为的测试。

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MockRunner;
use suite_runner::core::execution::SuiteExecutor;
use suite_runner::core::progress::{ProgressMonitor, Snapshot, SnapshotRow};

fn row(failed: Option<usize>, test_count: Option<usize>) -> SnapshotRow {
    SnapshotRow {
        label: "login on pixel-8".to_string(),
        failed,
        test_count,
    }
}

#[test]
fn a_pending_row_shows_an_ellipsis() {
    assert_eq!(row(None, None).score(), "...");
    assert_eq!(row(None, Some(10)).score(), "...");
    assert!(!row(None, Some(10)).is_finished());
}

#[test]
fn a_finished_row_shows_the_pass_fail_ratio() {
    assert_eq!(row(Some(0), Some(10)).score(), "10/10");
    assert_eq!(row(Some(3), Some(10)).score(), "7/10");
}

#[test]
fn a_finished_row_without_a_count_falls_back_to_a_marker() {
    assert_eq!(row(Some(0), None).score(), "pass");
    assert_eq!(row(Some(2), None).score(), "2 fail");
}

#[tokio::test]
async fn a_fresh_batch_snapshots_as_all_pending() {
    let sandbox = common::sandbox();
    let suites = sandbox.path().join("suites");
    common::write_suite(&suites, "alpha");
    common::write_suite(&suites, "beta");
    let config = Arc::new(common::config_for(sandbox.path()));
    let jobs = common::make_jobs(&config, vec![common::device("d1")]);

    let snapshot = Snapshot::capture(&jobs);
    assert_eq!(snapshot.total, 2);
    assert_eq!(snapshot.finished, 0);
    assert!(!snapshot.is_complete());
    assert!(snapshot.rows.iter().all(|row| row.score() == "..."));
}

#[tokio::test]
async fn a_finished_batch_snapshots_as_complete() {
    let sandbox = common::sandbox();
    let suites = sandbox.path().join("suites");
    common::write_suite(&suites, "alpha");
    let config = Arc::new(common::config_for(sandbox.path()));
    let jobs = common::make_jobs(&config, vec![common::device("d1"), common::device("d2")]);

    let runner = Arc::new(MockRunner::failing(10, 2, 0));
    SuiteExecutor::new(jobs.clone(), Arc::clone(&config), runner)
        .run_all()
        .await
        .unwrap();

    let snapshot = Snapshot::capture(&jobs);
    assert!(snapshot.is_complete());
    assert_eq!(snapshot.finished, 2);
    assert!(snapshot.rows.iter().all(|row| row.score() == "8/10"));
}

#[tokio::test]
async fn the_monitor_terminates_once_everything_finished() {
    let sandbox = common::sandbox();
    let suites = sandbox.path().join("suites");
    common::write_suite(&suites, "alpha");
    common::write_suite(&suites, "beta");
    let config = Arc::new(suite_runner::core::config::RunConfig {
        max_processes: 2,
        ..common::config_for(sandbox.path())
    });
    let jobs = common::make_jobs(&config, vec![common::device("d1")]);

    let monitor = ProgressMonitor::new(jobs.clone())
        .with_interval(Duration::from_millis(5))
        .spawn();

    let runner = Arc::new(MockRunner::passing(3).with_delay(Duration::from_millis(20)));
    SuiteExecutor::new(jobs, Arc::clone(&config), runner)
        .run_all()
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), monitor)
        .await
        .expect("monitor did not terminate")
        .expect("monitor task panicked");
}
