//! # Progress Monitor Module / 进度监视模块
//!
//! A lightweight task that watches the executing job list and keeps the
//! console informed. It derives a read-only snapshot from the jobs'
//! write-once fields on a fixed interval and prints one status block per
//! change in the finished count, never more, so a long quiet stretch does
//! not flood the log. Removing the monitor cannot change any execution
//! outcome.
//!
//! 一个监视执行中作业列表并向控制台汇报的轻量级任务。
//! 它以固定间隔从作业的一次性写入字段派生只读快照，并且仅在完成
//! 数量发生变化时打印一个状态块，因此长时间的安静阶段不会刷屏。
//! 移除监视器不会改变任何执行结果。

use colored::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::core::models::Job;
use crate::infra::t;

/// How often the monitor re-derives its snapshot.
/// 监视器重新派生快照的频率。
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One observed job: label plus whatever the write-once cells held at
/// capture time.
#[derive(Debug, Clone)]
pub struct SnapshotRow {
    /// `"<suite> on <device>"`.
    pub label: String,
    /// Failure count of the final run, if the job finished.
    pub failed: Option<usize>,
    /// Memoized test count, if the owning worker resolved it.
    pub test_count: Option<usize>,
}

impl SnapshotRow {
    pub fn is_finished(&self) -> bool {
        self.failed.is_some()
    }

    /// The seven-column score cell: `passed/total` for a finished job with
    /// a known test count, a bare pass/fail marker without one, and an
    /// ellipsis while the job is still running.
    pub fn score(&self) -> String {
        match (self.failed, self.test_count) {
            (Some(failed), Some(total)) => {
                format!("{}/{}", total.saturating_sub(failed), total)
            }
            (Some(0), None) => "pass".to_string(),
            (Some(failed), None) => format!("{} fail", failed),
            (None, _) => "...".to_string(),
        }
    }

    fn formatted(&self) -> String {
        let score = format!("{:<7}", self.score());
        let score = match self.failed {
            Some(0) => score.green(),
            Some(_) => score.red(),
            None => score.dimmed(),
        };
        format!("{}\t{}", score, self.label)
    }
}

/// A point-in-time view of the batch. Purely derived; capturing it never
/// blocks or mutates executor state.
/// 批次的某一时刻视图。完全派生；捕获它不会阻塞或修改执行器状态。
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub rows: Vec<SnapshotRow>,
    pub finished: usize,
    pub total: usize,
}

impl Snapshot {
    /// Reads the write-once cells of every job. The outcome cell is
    /// published after the test-count cell by the owning worker, so a row
    /// that shows a failure count also shows the count it was judged by.
    pub fn capture(jobs: &[Arc<Job>]) -> Self {
        let rows: Vec<SnapshotRow> = jobs
            .iter()
            .map(|job| SnapshotRow {
                label: job.to_string(),
                failed: job.outcome().map(|outcome| outcome.failed),
                test_count: job.cached_test_count(),
            })
            .collect();
        let finished = rows.iter().filter(|row| row.is_finished()).count();
        Snapshot {
            finished,
            total: rows.len(),
            rows,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.finished == self.total
    }
}

/// Polls the job list and prints status blocks until every job finished.
/// 轮询作业列表并打印状态块，直到所有作业完成。
pub struct ProgressMonitor {
    jobs: Vec<Arc<Job>>,
    interval: Duration,
}

impl ProgressMonitor {
    pub fn new(jobs: Vec<Arc<Job>>) -> Self {
        Self {
            jobs,
            interval: POLL_INTERVAL,
        }
    }

    /// Overrides the poll interval, mainly for tests.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawns the monitor task. It terminates on its own once the finished
    /// count reaches the total; the executor aborts it on a fatal error.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            let mut last_finished: Option<usize> = None;
            loop {
                interval.tick().await;
                let snapshot = Snapshot::capture(&self.jobs);
                if last_finished != Some(snapshot.finished) {
                    emit(&snapshot);
                    last_finished = Some(snapshot.finished);
                }
                if snapshot.is_complete() {
                    break;
                }
            }
        })
    }
}

fn emit(snapshot: &Snapshot) {
    for row in &snapshot.rows {
        println!("{}", row.formatted());
    }
    println!(
        "{}\n",
        t!(
            "run.progress_summary",
            finished = snapshot.finished,
            total = snapshot.total
        )
    );
}
