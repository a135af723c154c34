//! # Suite-Grouped Aggregation Module / 按套件分组聚合模块
//!
//! Merges the per-job artifacts into one tree grouped by test suite:
//!
//! ```text
//!          top level
//!       /    |      \
//!   suite  suite   suite
//!    / \    / \     / \
//!   d   d  d   d   d   d
//! ```
//!
//! where each `d` leaf artifact is one suite run on one device. Combining
//! the many result files written by parallel runs into one readable
//! hierarchy is the whole point of this module; a bad or missing artifact
//! is logged and its subtree skipped, never fatal for the rest.
//!
//! 将每个作业的产物合并为按测试套件分组的一棵树。
//! 每个叶子产物对应一个套件在一个设备上的运行。把并行运行写出的
//! 大量结果文件合并为可读的层级结构正是此模块的意义；损坏或缺失的
//! 产物会被记录并跳过其子树，绝不会影响其余部分。

use anyhow::Result;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::config::RunConfig;
use crate::core::models::{ARTIFACT_EXTENSION, Job};
use crate::infra::{fs, t};
use crate::reporting::model::{ReportOptions, ResultStore, ResultTree, ResultWriter};

/// File name of the final suite-grouped artifact.
/// 最终按套件分组产物的文件名。
pub const SUITE_REPORT_FILE: &str = "output.xml";

/// Distinct suite names across the job list, sorted so every aggregation
/// pass lays the report out identically.
pub(crate) fn distinct_suite_names(jobs: &[Arc<Job>]) -> Vec<String> {
    let mut names: Vec<String> = jobs.iter().map(|job| job.suite_name().to_string()).collect();
    names.sort();
    names.dedup();
    names
}

/// The suite-grouped aggregation strategy.
/// 按套件分组的聚合策略。
pub struct SuiteLogTree {
    jobs: Vec<Arc<Job>>,
    name: String,
    config: Arc<RunConfig>,
}

impl SuiteLogTree {
    pub fn new(jobs: &[Arc<Job>], name: impl Into<String>, config: Arc<RunConfig>) -> Self {
        Self {
            jobs: jobs.to_vec(),
            name: name.into(),
            config,
        }
    }

    /// The distinct suite names, in report order.
    pub fn suite_names(&self) -> Vec<String> {
        distinct_suite_names(&self.jobs)
    }

    /// Paths of the per-suite intermediate artifacts, in report order.
    pub fn result_paths(&self) -> Vec<PathBuf> {
        self.suite_names()
            .into_iter()
            .map(|name| {
                self.config
                    .outputdir
                    .join(format!("{}.{}", name, ARTIFACT_EXTENSION))
            })
            .collect()
    }

    /// Merges every device artifact under one suite's output directory into
    /// `outputdir/<suite>.xml`.
    fn merge_suite(&self, store: &dyn ResultStore, suite_name: &str) -> Result<()> {
        let dir = self.config.outputdir.join(suite_name);
        let mut node = ResultTree::named(suite_name);
        for file in fs::list_artifact_files(&dir)? {
            match store.load(&file) {
                Ok(child) => node.push_suite(child),
                Err(e) => eprintln!(
                    "{}",
                    t!(
                        "report.artifact_skipped",
                        path = file.display(),
                        error = e
                    )
                    .red()
                ),
            }
        }
        store.save(
            &node,
            &self
                .config
                .outputdir
                .join(format!("{}.{}", suite_name, ARTIFACT_EXTENSION)),
        )
    }

    /// Builds and saves the per-suite intermediates, combines them under
    /// one root named after the run, saves `output.xml` and renders the
    /// combined log + report.
    pub fn write(&self, store: &dyn ResultStore, writer: &dyn ResultWriter) -> Result<()> {
        for suite_name in self.suite_names() {
            if let Err(e) = self.merge_suite(store, &suite_name) {
                eprintln!(
                    "{}",
                    t!("report.suite_merge_failed", name = suite_name, error = e).red()
                );
            }
        }

        let mut root = ResultTree::named(&self.name);
        for path in self.result_paths() {
            match store.load(&path) {
                Ok(child) => root.push_suite(child),
                Err(e) => eprintln!(
                    "{}",
                    t!(
                        "report.artifact_skipped",
                        path = path.display(),
                        error = e
                    )
                    .red()
                ),
            }
        }

        let final_path = self.config.outputdir.join(SUITE_REPORT_FILE);
        store.save(&root, &final_path)?;
        println!("{}", t!("report.writing_report", path = final_path.display()));
        writer.write_report(
            &final_path,
            &self.config.outputdir,
            &ReportOptions::combined(self.config.suite_stat_level),
        )
    }
}
