//! # Runner Process Module / 运行器进程模块
//!
//! The production `TestRunner`: every job run spawns one external runner
//! process (a Robot Framework-compatible CLI), which isolates the runner's
//! per-run global state behind an OS process boundary. Only the job's
//! immutable fields cross that boundary, as command-line arguments.
//!
//! 生产环境的 `TestRunner`：每次作业运行都会派生一个外部运行器进程
//! （兼容 Robot Framework 的 CLI），通过操作系统进程边界隔离运行器的
//! 每次运行全局状态。只有作业的不可变字段以命令行参数的形式跨越该边界。

use anyhow::{Context, Result, bail};
use futures::future::BoxFuture;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

use crate::core::execution::{OutputSinks, TestRunner};
use crate::core::models::Job;
use crate::reporting::model::{ResultStore, XmlResultStore};

/// Highest exit code the runner uses to report a failure count. Robot
/// Framework reports 0-249 failed tests directly and caps at 250 for "250
/// or more"; anything above is an internal error or a bad invocation.
/// 运行器用于报告失败数量的最高退出码。Robot Framework 直接报告
/// 0-249 个失败测试，250 表示“250 个或更多”；超过该值表示内部错误
/// 或无效调用。
const MAX_FAILURE_EXIT_CODE: i32 = 250;

/// Invokes the configured runner command for each job.
/// 为每个作业调用配置的运行器命令。
pub struct ProcessTestRunner {
    program: String,
    base_args: Vec<String>,
    store: XmlResultStore,
}

impl ProcessTestRunner {
    /// Splits the configured command line with shell rules, expanding `~`
    /// and environment variables first (so `--runner "python -m robot"`
    /// and `--runner ~/bin/robot` both work).
    pub fn from_command(command: &str) -> Result<Self> {
        let expanded = shellexpand::full(command)
            .with_context(|| format!("failed to expand runner command: {}", command))?
            .to_string();
        let mut parts = shlex::split(&expanded)
            .ok_or_else(|| anyhow::anyhow!("failed to parse runner command: {}", expanded))?;
        if parts.is_empty() {
            bail!("runner command is empty");
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            base_args: parts,
            store: XmlResultStore,
        })
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args).kill_on_drop(true);
        cmd
    }

    /// Arguments shared by real runs and dry runs: variables and the
    /// optional test-case and tag filters.
    fn push_filters(&self, cmd: &mut Command, job: &Job) {
        for variable in job.variables() {
            cmd.arg("--variable").arg(variable);
        }
        if let Some(test) = &job.config().debug_testcase {
            cmd.arg("--test").arg(test);
        }
        if let Some(tags) = &job.config().include_tags {
            cmd.arg("--include").arg(tags);
        }
    }
}

impl TestRunner for ProcessTestRunner {
    fn run<'a>(
        &'a self,
        job: &'a Job,
        sinks: Option<OutputSinks>,
    ) -> BoxFuture<'a, Result<usize>> {
        Box::pin(async move {
            let mut cmd = self.base_command();
            cmd.arg("--name")
                .arg(job.display_name())
                .arg("--output")
                .arg(format!("{}/{}", job.suite_name(), job.output_file_name()))
                .arg("--outputdir")
                .arg(&job.config().outputdir)
                .arg("--loglevel")
                .arg(&job.config().loglevel)
                // Per-run HTML is suppressed; rendering happens once, from
                // the merged artifacts.
                .arg("--log")
                .arg("NONE")
                .arg("--report")
                .arg("NONE");
            self.push_filters(&mut cmd, job);
            cmd.arg(job.source());

            if let Some(sinks) = sinks {
                cmd.stdout(Stdio::from(sinks.stdout))
                    .stderr(Stdio::from(sinks.stderr));
            }

            let status = cmd
                .status()
                .await
                .with_context(|| format!("failed to spawn test runner '{}'", self.program))?;
            failures_from_status(status)
        })
    }

    fn count_tests<'a>(&'a self, job: &'a Job) -> BoxFuture<'a, Result<usize>> {
        Box::pin(async move {
            let scratch = tempfile::tempdir().context("cannot create dry-run scratch dir")?;
            let artifact = scratch.path().join("dryrun.xml");

            let mut cmd = self.base_command();
            cmd.arg("--dryrun")
                .arg("--output")
                .arg(&artifact)
                .arg("--outputdir")
                .arg(scratch.path())
                .arg("--log")
                .arg("NONE")
                .arg("--report")
                .arg("NONE");
            self.push_filters(&mut cmd, job);
            cmd.arg(job.source())
                .stdout(Stdio::null())
                .stderr(Stdio::null());

            // Dry-run failures still produce an artifact with the full test
            // list, so the exit status is deliberately ignored here.
            let _ = cmd
                .status()
                .await
                .with_context(|| format!("failed to spawn test runner '{}'", self.program))?;

            let tree = self.store.load(&artifact)?;
            Ok(tree.test_count())
        })
    }
}

/// Maps the runner's exit status onto a failure count, or a dispatch error
/// for a signal kill or an out-of-band exit code.
fn failures_from_status(status: ExitStatus) -> Result<usize> {
    match status.code() {
        None => bail!("test runner terminated by a signal"),
        Some(code @ 0..=MAX_FAILURE_EXIT_CODE) => Ok(code as usize),
        Some(code) => bail!("test runner exited with status {}", code),
    }
}
