//! # File System Operations Module / 文件系统操作模块
//!
//! Small file system helpers shared by the report aggregators.
//!
//! 报告聚合器共享的小型文件系统辅助功能。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::models::ARTIFACT_EXTENSION;

/// Lists the result artifacts (`*.xml`) directly inside `dir`, sorted by
/// file name so every aggregation pass walks them in the same order.
///
/// 列出 `dir` 中的结果产物（`*.xml`），按文件名排序，
/// 以便每次聚合都以相同顺序遍历它们。
pub fn list_artifact_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("cannot read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == ARTIFACT_EXTENSION)
        })
        .collect();
    files.sort();
    Ok(files)
}
