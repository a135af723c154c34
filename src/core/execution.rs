//! # Job Execution Engine Module / 作业执行引擎模块
//!
//! This module runs the job matrix to completion: sequentially and verbose
//! for trivial batches, otherwise through a bounded pool of concurrent
//! workers with a progress monitor alongside. It also defines the
//! `TestRunner` seam behind which the external runner process lives.
//!
//! 此模块将作业矩阵运行至完成：对简单批次采用顺序且详细输出的方式，
//! 否则通过有界的并发工作池执行，并伴随一个进度监视器。
//! 它还定义了 `TestRunner` 接缝，外部运行器进程位于其后。

use anyhow::Result;
use colored::*;
use futures::future::BoxFuture;
use futures::{StreamExt, stream};
use std::fs::File;
use std::sync::Arc;
use std::time::Instant;

use crate::core::config::RunConfig;
use crate::core::models::{Job, JobOutcome, RunnerError};
use crate::core::progress::ProgressMonitor;
use crate::infra::t;

/// Fraction of failed test cases above which a suite is rerun once.
/// 失败测试用例比例超过该值时，套件将被重跑一次。
const RERUN_FAIL_RATE: f64 = 0.5;

/// Open file sinks that receive the redirected stdout/stderr of one run.
/// `None` sinks mean verbose mode: the runner inherits the console.
///
/// 接收单次运行重定向的 stdout/stderr 的已打开文件。
/// 没有 sink 即为详细模式：运行器继承控制台。
pub struct OutputSinks {
    pub stdout: File,
    pub stderr: File,
}

impl OutputSinks {
    /// Creates (truncating) the `.out`/`.err` sinks of a job. A rerun gets
    /// fresh sinks so the files hold the final attempt only.
    pub fn create(job: &Job) -> Result<Self> {
        let stdout = File::create(job.stdout_path())?;
        let stderr = File::create(job.stderr_path())?;
        Ok(Self { stdout, stderr })
    }
}

/// The external test runner seam.
///
/// Implementations execute one suite against one device and report the
/// number of failed test cases; the result artifact and the redirected
/// console files are side effects under the job's output directory.
/// `count_tests` asks the runner to parse and filter the definition
/// without really executing it.
///
/// 外部测试运行器接缝。
/// 实现针对单个设备执行单个套件并报告失败的测试用例数量；
/// 结果产物和重定向的控制台文件是作业输出目录下的副作用。
/// `count_tests` 请求运行器解析并过滤定义而不真正执行。
pub trait TestRunner: Send + Sync {
    /// Runs the job once. Returns the failure count; a per-test failure is
    /// not an error. `Err` means the dispatch itself failed.
    fn run<'a>(&'a self, job: &'a Job, sinks: Option<OutputSinks>)
    -> BoxFuture<'a, Result<usize>>;

    /// Parses and filters the suite, returning how many test cases it
    /// would execute.
    fn count_tests<'a>(&'a self, job: &'a Job) -> BoxFuture<'a, Result<usize>>;
}

/// Runs the fixed job list to completion under the configured concurrency
/// limit.
///
/// The executor owns a worker pool by composition: it drives a buffered
/// stream of per-job futures rather than being a pool itself, so pool
/// lifetime and orchestration policy stay separate concerns. Outcomes are
/// observed through the jobs' own write-once fields, not a return value.
///
/// 在配置的并发上限下将固定的作业列表运行至完成。
/// 执行器通过组合拥有工作池：它驱动一个由每作业 future 组成的
/// 缓冲流，而不是自身继承池，因此池的生命周期与编排策略相互独立。
/// 结果通过作业自身的一次性写入字段观察，而非返回值。
pub struct SuiteExecutor {
    jobs: Vec<Arc<Job>>,
    config: Arc<RunConfig>,
    runner: Arc<dyn TestRunner>,
}

impl SuiteExecutor {
    pub fn new(jobs: Vec<Arc<Job>>, config: Arc<RunConfig>, runner: Arc<dyn TestRunner>) -> Self {
        Self {
            jobs,
            config,
            runner,
        }
    }

    /// Runs every job and returns once all of them finished, or with the
    /// first dispatch error. Completion order across jobs is unspecified;
    /// a rerun always happens strictly after the first attempt of the same
    /// job.
    pub async fn run_all(&self) -> Result<()> {
        if self.jobs.is_empty() {
            return Ok(());
        }

        // A single job or a limit of one means there is nothing to overlap:
        // run in order and let the runner write straight to the console.
        if self.jobs.len() <= 1 || self.config.max_processes <= 1 {
            println!(
                "{}",
                t!("run.sequential_start", count = self.jobs.len()).bold()
            );
            for job in &self.jobs {
                run_job(job, &*self.runner, &self.config, true).await?;
            }
            return Ok(());
        }

        println!(
            "{}",
            t!(
                "run.executor_start",
                count = self.jobs.len(),
                processes = self.config.max_processes
            )
            .bold()
        );

        let monitor = ProgressMonitor::new(self.jobs.clone()).spawn();

        let runner = &self.runner;
        let config = &self.config;
        let mut pending = stream::iter(self.jobs.iter().map(|job| {
            let job = Arc::clone(job);
            let runner = Arc::clone(runner);
            let config = Arc::clone(config);
            async move { run_job(&job, &*runner, &config, false).await }
        }))
        .buffer_unordered(self.config.max_processes);

        while let Some(result) = pending.next().await {
            if let Err(e) = result {
                // Fatal: dropping the stream cancels everything still queued.
                monitor.abort();
                eprintln!("{}", t!("run.dispatch_failed", error = e).red());
                return Err(e);
            }
        }
        drop(pending);

        // The monitor exits on its own once it observes finished == total.
        let _ = monitor.await;
        Ok(())
    }
}

/// Runs one job: output directory, sinks, test-count memoization, the run
/// itself, the rerun policy, and the single outcome write.
async fn run_job(
    job: &Job,
    runner: &dyn TestRunner,
    config: &RunConfig,
    verbose: bool,
) -> Result<()> {
    std::fs::create_dir_all(job.output_dir()).map_err(|e| RunnerError::Dispatch {
        job: job.to_string(),
        message: format!("cannot create output directory: {}", e),
    })?;

    // Memoize the filtered test count before the first attempt so the
    // progress monitor can show a pass/fail ratio the moment the job
    // finishes. An unresolvable count only disables the rerun policy.
    let test_count = match resolve_test_count(job, runner).await {
        Ok(count) => Some(count),
        Err(e) => {
            eprintln!(
                "{}",
                t!("run.count_failed", name = job, error = e).yellow()
            );
            None
        }
    };

    let started = Instant::now();
    let sinks = open_sinks(job, verbose)?;
    let mut failed = dispatch(job, runner, sinks).await?;
    let mut attempts: u8 = 1;

    if should_rerun(config, test_count, failed) {
        println!("{}", t!("run.rerun_triggered", name = job).yellow());
        let sinks = open_sinks(job, verbose)?;
        failed = dispatch(job, runner, sinks).await?;
        attempts = 2;
    }

    job.record_outcome(JobOutcome {
        failed,
        attempts,
        duration: started.elapsed(),
    });
    Ok(())
}

fn open_sinks(job: &Job, verbose: bool) -> Result<Option<OutputSinks>> {
    if verbose {
        return Ok(None);
    }
    OutputSinks::create(job)
        .map(Some)
        .map_err(|e| {
            RunnerError::Dispatch {
                job: job.to_string(),
                message: format!("cannot open console sinks: {}", e),
            }
            .into()
        })
}

async fn dispatch(job: &Job, runner: &dyn TestRunner, sinks: Option<OutputSinks>) -> Result<usize> {
    runner.run(job, sinks).await.map_err(|e| {
        RunnerError::Dispatch {
            job: job.to_string(),
            message: format!("{:#}", e),
        }
        .into()
    })
}

/// The rerun policy: exactly one rerun, iff rerunning is enabled, the
/// filtered test count is known and nonzero, and more than half of the
/// test cases failed. Evaluated per job, independent of every other job.
fn should_rerun(config: &RunConfig, test_count: Option<usize>, failed: usize) -> bool {
    if !config.rerun_failed {
        return false;
    }
    match test_count {
        Some(total) if total > 0 => (failed as f64 / total as f64) > RERUN_FAIL_RATE,
        _ => false,
    }
}

/// Returns the job's memoized test count, asking the runner on first use.
/// Only ever called by the worker that owns the job.
async fn resolve_test_count(job: &Job, runner: &dyn TestRunner) -> Result<usize> {
    if let Some(count) = job.cached_test_count() {
        return Ok(count);
    }
    let count = runner.count_tests(job).await?;
    Ok(job.memoize_test_count(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(rerun: bool) -> RunConfig {
        RunConfig {
            rerun_failed: rerun,
            ..RunConfig::default()
        }
    }

    #[test]
    fn rerun_requires_the_flag() {
        assert!(!should_rerun(&config_with(false), Some(10), 10));
    }

    #[test]
    fn rerun_requires_a_majority_of_failures() {
        let config = config_with(true);
        assert!(!should_rerun(&config, Some(10), 5));
        assert!(should_rerun(&config, Some(10), 6));
    }

    #[test]
    fn rerun_requires_a_known_nonzero_test_count() {
        let config = config_with(true);
        assert!(!should_rerun(&config, Some(0), 3));
        assert!(!should_rerun(&config, None, 3));
    }
}
