//! # Job Matrix Planner Module / 作业矩阵规划模块
//!
//! This module expands the configured suite paths and crosses them with the
//! device matrix into a flat list of independent jobs. The job list is
//! fixed once built; every later stage (executor, monitor, aggregators)
//! walks the same list.
//!
//! 此模块展开配置的套件路径，并将其与设备矩阵交叉组合成一个扁平的
//! 独立作业列表。作业列表一经构建即固定；之后的每个阶段
//! （执行器、监视器、聚合器）都遍历同一个列表。

use crate::core::config::RunConfig;
use crate::core::models::{Device, Job, RunnerError};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File extension of test suite definition files.
/// 测试套件定义文件的扩展名。
pub const SUITE_FILE_EXTENSION: &str = "robot";

/// Expands the configured paths into a flat, deduplicated list of suite
/// files.
///
/// Directories contribute every contained `*.robot` file in sorted order;
/// non-directories pass through unchanged. A path that does not exist, or
/// an expansion that ends up empty, is a configuration error.
///
/// 将配置的路径展开为扁平、去重的套件文件列表。
/// 目录按排序顺序贡献其中的每个 `*.robot` 文件；非目录原样通过。
/// 不存在的路径或最终为空的展开结果都是配置错误。
pub fn expand_suite_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)
                .map_err(|e| {
                    RunnerError::Configuration(format!(
                        "cannot read test path {}: {}",
                        path.display(),
                        e
                    ))
                })?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| is_suite_file(p))
                .collect();
            files.sort();
            expanded.extend(files);
        } else if path.exists() {
            expanded.push(path.clone());
        } else {
            return Err(RunnerError::Configuration(format!(
                "test path {} does not exist",
                path.display()
            ))
            .into());
        }
    }

    // Listing a file explicitly and again through its directory must not
    // produce two jobs for the same (suite, device) pair.
    let mut unique = Vec::with_capacity(expanded.len());
    for path in expanded {
        if !unique.contains(&path) {
            unique.push(path);
        }
    }

    if unique.is_empty() {
        return Err(
            RunnerError::Configuration("no test suites resolved from the given paths".into())
                .into(),
        );
    }

    Ok(unique)
}

fn is_suite_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == SUITE_FILE_EXTENSION)
}

/// Builds the full job matrix: one job per (suite, device) pair.
///
/// The order is stable and documented: outer loop over devices in file
/// order, inner loop over the expanded suite paths. The report aggregators
/// rely on the list containing every pair exactly once.
///
/// Suite names must be unique because the output directory is keyed by
/// suite name; two files with the same stem would race on one directory.
///
/// 构建完整的作业矩阵：每个（套件，设备）对一个作业。
/// 顺序是稳定且有文档保证的：外层按文件顺序遍历设备，
/// 内层遍历展开后的套件路径。报告聚合器依赖列表中每个组合
/// 恰好出现一次。由于输出目录以套件名称为键，套件名称必须唯一。
pub fn build_jobs(config: &Arc<RunConfig>, devices: Vec<Device>) -> Result<Vec<Arc<Job>>> {
    let suite_paths = expand_suite_paths(&config.test_file_paths)?;

    let mut stems = std::collections::BTreeSet::new();
    for path in &suite_paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !stems.insert(stem.clone()) {
            return Err(RunnerError::Configuration(format!(
                "duplicate test suite name '{}': output directories are keyed by suite name",
                stem
            ))
            .into());
        }
    }

    let devices: Vec<Arc<Device>> = devices.into_iter().map(Arc::new).collect();

    let mut jobs = Vec::with_capacity(devices.len() * suite_paths.len());
    for device in &devices {
        for path in &suite_paths {
            jobs.push(Arc::new(Job::new(
                path.clone(),
                Arc::clone(device),
                Arc::clone(config),
            )));
        }
    }

    Ok(jobs)
}
