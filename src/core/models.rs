//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the suite
//! runner: target devices, executable jobs, job outcomes and the error
//! taxonomy shared by the executor and the report aggregators.
//!
//! 此模块定义了整个套件运行器中使用的核心数据结构：
//! 目标设备、可执行作业、作业结果以及执行器和报告聚合器共享的错误分类。

use crate::core::config::RunConfig;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// The file name extension of result artifacts produced by the test runner.
/// 测试运行器生成的结果产物的文件扩展名。
pub const ARTIFACT_EXTENSION: &str = "xml";

/// A single target device from the device matrix.
///
/// A device is a named, immutable bag of attributes (platform, form factor,
/// browser, ...). The attribute keys are free-form; whatever the devices
/// file declares is passed through to the test runner as `key:value`
/// variables. Identity is the `name` field.
///
/// 设备矩阵中的单个目标设备。
/// 设备是一个命名的、不可变的属性集合（平台、形态、浏览器等）。
/// 属性键是自由格式的；设备文件中声明的内容会作为 `key:value`
/// 变量传递给测试运行器。`name` 字段是其标识。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// The unique name of the device, used for display and artifact naming.
    /// 设备的唯一名称，用于显示和产物命名。
    pub name: String,
    /// `true` when the device is the local machine (or a device attached to
    /// it). Local runs always execute with a single process.
    /// 当设备是本地机器（或连接到本地机器的设备）时为 `true`。
    /// 本地运行始终以单进程执行。
    #[serde(default)]
    pub local_device: bool,
    /// Arbitrary attribute key/value pairs from the devices file.
    /// 来自设备文件的任意属性键值对。
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl Device {
    /// Creates the synthetic device used for `--local` runs.
    pub fn local() -> Self {
        Self {
            name: "local".to_string(),
            local_device: true,
            attributes: BTreeMap::new(),
        }
    }

    /// The stable display name of the device: the literal `"local"` for the
    /// local device, otherwise the configured name.
    pub fn display_name(&self) -> &str {
        if self.local_device { "local" } else { &self.name }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The final outcome of running one job.
///
/// A failure count of zero means every test case passed. Per-test failures
/// are ordinary data, never errors: they flow through the rerun policy and
/// into the reports.
///
/// 运行一个作业的最终结果。
/// 失败计数为零表示所有测试用例都通过了。单个测试的失败是普通数据，
/// 而不是错误：它们经过重跑策略并进入报告。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    /// Number of failed test cases reported by the test runner.
    /// 测试运行器报告的失败测试用例数量。
    pub failed: usize,
    /// How many times the suite was executed (2 when the rerun policy fired).
    /// 套件被执行的次数（重跑策略触发时为 2）。
    pub attempts: u8,
    /// Wall-clock time spent across all attempts.
    /// 所有尝试所花费的总时长。
    pub duration: Duration,
}

impl JobOutcome {
    /// `true` when no test case failed.
    pub fn is_pass(&self) -> bool {
        self.failed == 0
    }
}

/// One unit of work: a single test suite executed against a single device.
///
/// A job owns no mutable state once constructed except two write-once
/// cells: the memoized test count and the outcome of its final run. Both
/// are written exactly once, by the worker that owns the job; the progress
/// monitor and the aggregators only ever read them.
///
/// 一个工作单元：针对单个设备执行的单个测试套件。
/// 作业构造后不拥有可变状态，除了两个一次性写入的单元：
/// 记忆化的测试数量和最终运行的结果。两者都由拥有该作业的
/// 工作者写入且仅写入一次；进度监视器和聚合器只会读取它们。
#[derive(Debug)]
pub struct Job {
    source: PathBuf,
    suite_name: String,
    device: Arc<Device>,
    config: Arc<RunConfig>,
    test_count: OnceCell<usize>,
    outcome: OnceCell<JobOutcome>,
}

impl Job {
    /// Builds a job for `source` on `device`. The suite name is the file
    /// stem of the source path.
    pub fn new(source: PathBuf, device: Arc<Device>, config: Arc<RunConfig>) -> Self {
        let suite_name = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string_lossy().into_owned());
        Self {
            source,
            suite_name,
            device,
            config,
            test_count: OnceCell::new(),
            outcome: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Display name of the job's device (`"local"` for local runs).
    pub fn display_name(&self) -> &str {
        self.device.display_name()
    }

    /// The directory that receives every artifact of this job. Two jobs
    /// never share a directory entry: the directory is keyed by suite name
    /// and the file names inside it by device name.
    pub fn output_dir(&self) -> PathBuf {
        self.config.outputdir.join(&self.suite_name)
    }

    /// Artifact file name relative to `output_dir()`, e.g. `pixel-8.xml`.
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.display_name(), ARTIFACT_EXTENSION)
    }

    /// Absolute path of the result artifact written by the test runner.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir().join(self.output_file_name())
    }

    /// Path of the redirected stdout sink.
    pub fn stdout_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.out", self.display_name()))
    }

    /// Path of the redirected stderr sink.
    pub fn stderr_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.err", self.display_name()))
    }

    /// Variables handed to the test runner: every device attribute as
    /// `key:value` plus `name:<display name>`.
    ///
    /// 传递给测试运行器的变量：每个设备属性作为 `key:value`，
    /// 外加 `name:<显示名称>`。
    pub fn variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = self
            .device
            .attributes
            .iter()
            .map(|(key, value)| format!("{}:{}", key, value))
            .collect();
        vars.push(format!("name:{}", self.display_name()));
        vars
    }

    /// The memoized test count, if the owning worker has resolved it yet.
    pub fn cached_test_count(&self) -> Option<usize> {
        self.test_count.get().copied()
    }

    /// Memoizes the test count. Only the worker that owns the job may call
    /// this; a second call returns the first value unchanged.
    pub(crate) fn memoize_test_count(&self, count: usize) -> usize {
        *self.test_count.get_or_init(|| count)
    }

    /// Records the final outcome of the job. Must be called at most once,
    /// by the owning worker, after the rerun policy has been evaluated.
    pub(crate) fn record_outcome(&self, outcome: JobOutcome) {
        // The single-writer discipline makes a second write a logic error.
        debug_assert!(self.outcome.get().is_none(), "job outcome recorded twice");
        let _ = self.outcome.set(outcome);
    }

    pub fn outcome(&self) -> Option<&JobOutcome> {
        self.outcome.get()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.get().is_some()
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.suite_name, self.display_name())
    }
}

/// The error taxonomy of the runner.
///
/// `Configuration` and `Dispatch` are fatal and terminate the process with
/// a non-zero status. `Artifact` is recoverable: the aggregators log it and
/// skip the affected subtree.
///
/// 运行器的错误分类。
/// `Configuration` 和 `Dispatch` 是致命错误，会以非零状态终止进程。
/// `Artifact` 是可恢复的：聚合器会记录它并跳过受影响的子树。
#[derive(Debug)]
pub enum RunnerError {
    /// A missing or unreadable devices file, or no test suites resolved.
    /// Raised before any job runs.
    Configuration(String),
    /// The run operation itself failed (spawn error, signal, runner internal
    /// error) as opposed to a test-level failure. Aborts the batch.
    Dispatch {
        /// Identity of the offending job, `"<suite> on <device>"`.
        job: String,
        message: String,
    },
    /// A missing or unparsable result artifact during aggregation.
    Artifact { path: PathBuf, message: String },
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerError::Configuration(message) => {
                write!(f, "configuration error: {}", message)
            }
            RunnerError::Dispatch { job, message } => {
                write!(f, "dispatch error for {}: {}", job, message)
            }
            RunnerError::Artifact { path, message } => {
                write!(f, "artifact error for {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for RunnerError {}
