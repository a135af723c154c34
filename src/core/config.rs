//! # Run Configuration Module / 运行配置模块
//!
//! This module defines the process-wide run configuration and the loading
//! of the device matrix from the devices file. The configuration is built
//! once from the command line and shared by reference; nothing mutates it
//! after construction.
//!
//! 此模块定义进程级的运行配置以及从设备文件加载设备矩阵。
//! 配置在命令行解析时构建一次并通过引用共享；构建后不会被修改。

use crate::core::models::{Device, RunnerError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Shape of the devices file: a single `devices` array of named records.
/// 设备文件的结构：一个名为 `devices` 的命名记录数组。
#[derive(Debug, Deserialize)]
struct DeviceList {
    devices: Vec<Device>,
}

/// Process-wide, read-only run configuration.
///
/// Every component receives an `Arc<RunConfig>`; the struct is never
/// mutated after the command line has been parsed, which rules out the
/// cross-job state leakage a mutable mapping would invite.
///
/// 进程级的只读运行配置。
/// 每个组件都接收一个 `Arc<RunConfig>`；命令行解析完成后该结构
/// 不再被修改，从而排除了可变映射可能带来的跨作业状态泄漏。
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    /// Log level forwarded to the test runner (`--loglevel`).
    /// 转发给测试运行器的日志级别（`--loglevel`）。
    pub loglevel: String,
    /// Upper bound on concurrently running jobs.
    /// 并发运行作业数量的上限。
    pub max_processes: usize,
    /// Run against the local machine instead of a device matrix.
    /// 针对本地机器运行，而不是设备矩阵。
    pub local_device: bool,
    /// Name of the root node of both final reports.
    /// 两个最终报告的根节点名称。
    pub top_level_name: String,
    /// Depth to which report statistics are expanded. Rendering only; merge
    /// semantics are unaffected.
    /// 报告统计信息展开的深度。仅影响渲染，不影响合并语义。
    pub suite_stat_level: usize,
    /// Optional single-test-case filter forwarded as `--test`.
    /// 可选的单个测试用例过滤器，作为 `--test` 转发。
    pub debug_testcase: Option<String>,
    /// Optional tag filter forwarded as `--include`.
    /// 可选的标签过滤器，作为 `--include` 转发。
    pub include_tags: Option<String>,
    /// Path of the JSON file listing the device matrix.
    /// 列出设备矩阵的 JSON 文件的路径。
    pub devices_file: PathBuf,
    /// Rerun a suite once when more than half of its test cases failed.
    /// 当超过一半的测试用例失败时，将套件重跑一次。
    pub rerun_failed: bool,
    /// Root directory that receives every artifact and report.
    /// 接收所有产物和报告的根目录。
    pub outputdir: PathBuf,
    /// Command line of the external test runner, split with shell rules.
    /// 外部测试运行器的命令行，按 shell 规则拆分。
    pub runner_command: String,
    /// Test suite files or directories to expand and run.
    /// 要展开并运行的测试套件文件或目录。
    pub test_file_paths: Vec<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            loglevel: "DEBUG".to_string(),
            max_processes: default_max_processes(),
            local_device: false,
            top_level_name: "Smoke Tests".to_string(),
            suite_stat_level: 3,
            debug_testcase: None,
            include_tags: None,
            devices_file: PathBuf::from("devices.json"),
            rerun_failed: false,
            outputdir: PathBuf::from("results"),
            runner_command: "robot".to_string(),
            test_file_paths: vec![PathBuf::from("tests/")],
        }
    }
}

/// Default concurrency: 4 or twice the CPU count, whichever is higher.
/// 默认并发度：4 或 CPU 数量的两倍，取较大者。
pub fn default_max_processes() -> usize {
    std::cmp::max(4, num_cpus::get() * 2)
}

/// Loads the device matrix according to the configuration.
///
/// The `--local` shortcut yields exactly one synthetic local device and
/// never touches the file system. Otherwise the devices file must exist,
/// parse, be non-empty and contain no duplicate names; any violation is a
/// fatal `RunnerError::Configuration` raised before a single job is built.
///
/// 根据配置加载设备矩阵。
/// `--local` 快捷方式恰好生成一个合成的本地设备，且完全不接触文件系统。
/// 否则设备文件必须存在、可解析、非空且不含重复名称；
/// 任何违反都会在构建作业之前触发致命的 `RunnerError::Configuration`。
pub fn load_device_list(config: &RunConfig) -> Result<Vec<Device>> {
    if config.local_device {
        return Ok(vec![Device::local()]);
    }

    let path = &config.devices_file;
    if !path.exists() {
        return Err(RunnerError::Configuration(format!(
            "devices file {} does not exist",
            path.display()
        ))
        .into());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        RunnerError::Configuration(format!(
            "devices file {} is not readable: {}",
            path.display(),
            e
        ))
    })?;

    let list: DeviceList = serde_json::from_str(&content).map_err(|e| {
        RunnerError::Configuration(format!(
            "devices file {} is not valid JSON: {}",
            path.display(),
            e
        ))
    })?;

    if list.devices.is_empty() {
        return Err(RunnerError::Configuration(format!(
            "devices file {} contains no devices",
            path.display()
        ))
        .into());
    }

    let mut seen = std::collections::BTreeSet::new();
    for device in &list.devices {
        if !seen.insert(device.name.as_str()) {
            return Err(RunnerError::Configuration(format!(
                "devices file {} contains duplicate device name '{}'",
                path.display(),
                device.name
            ))
            .into());
        }
    }

    Ok(list.devices)
}

/// Serializes the configuration as pretty JSON for the startup banner.
pub fn config_as_json(config: &RunConfig) -> Result<String> {
    serde_json::to_string_pretty(config).context("failed to serialize run configuration")
}
