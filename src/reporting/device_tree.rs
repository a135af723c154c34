//! # Device-Grouped Aggregation Module / 按设备分组聚合模块
//!
//! The complementary view of the same artifacts: one subtree per device,
//! with one child per suite that ran on it. The device artifact file names
//! are taken from the first suite's output directory; each name is then
//! gathered across every suite directory.
//!
//! 同一批产物的互补视图：每个设备一棵子树，其每个子节点对应在该
//! 设备上运行过的一个套件。设备产物文件名取自第一个套件的输出目录；
//! 然后在每个套件目录中收集同名文件。

use anyhow::Result;
use colored::*;
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;

use crate::core::config::RunConfig;
use crate::core::models::Job;
use crate::infra::{fs, t};
use crate::reporting::model::{ReportOptions, ResultStore, ResultTree, ResultWriter};
use crate::reporting::suite_tree::distinct_suite_names;

/// File name of the final device-grouped artifact.
/// 最终按设备分组产物的文件名。
pub const DEVICE_REPORT_FILE: &str = "devices.xml";

/// Log file name of the rendered device-grouped report (log-only, so it
/// cannot collide with the suite-grouped report pair).
pub const DEVICE_LOG_FILE: &str = "devices.html";

/// The device-grouped aggregation strategy.
/// 按设备分组的聚合策略。
pub struct DeviceLogTree {
    jobs: Vec<Arc<Job>>,
    name: String,
    config: Arc<RunConfig>,
    device_filenames: OnceCell<Vec<String>>,
}

impl DeviceLogTree {
    pub fn new(jobs: &[Arc<Job>], name: impl Into<String>, config: Arc<RunConfig>) -> Self {
        Self {
            jobs: jobs.to_vec(),
            name: name.into(),
            config,
            device_filenames: OnceCell::new(),
        }
    }

    pub fn suite_names(&self) -> Vec<String> {
        distinct_suite_names(&self.jobs)
    }

    /// The per-device artifact file names, memoized from the first suite's
    /// output directory, sorted. Every suite directory holds the same file
    /// names because every device ran every suite.
    pub fn device_filenames(&self) -> Result<&[String]> {
        let names = self.device_filenames.get_or_try_init(|| -> Result<Vec<String>> {
            let first_suite = match self.suite_names().into_iter().next() {
                Some(name) => name,
                None => return Ok(Vec::new()),
            };
            let dir = self.config.outputdir.join(first_suite);
            let names = fs::list_artifact_files(&dir)?
                .into_iter()
                .filter_map(|path| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                })
                .collect();
            Ok(names)
        })?;
        Ok(names)
    }

    /// Gathers one device's artifact from every suite directory into
    /// `outputdir/<device>.xml`, renaming each child to its suite so the
    /// subtree reads "device → suites".
    fn merge_device(&self, store: &dyn ResultStore, file_name: &str) -> Result<()> {
        let device_name = file_stem(file_name);
        let mut node = ResultTree::named(device_name);
        for suite_name in self.suite_names() {
            let path = self.config.outputdir.join(&suite_name).join(file_name);
            match store.load(&path) {
                Ok(mut child) => {
                    child.name = suite_name;
                    node.push_suite(child);
                }
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
        store.save(&node, &self.config.outputdir.join(file_name))
    }

    /// Builds and saves the per-device intermediates, combines them under
    /// one root named after the run, saves `devices.xml` and renders the
    /// log-only device report.
    pub fn write(&self, store: &dyn ResultStore, writer: &dyn ResultWriter) -> Result<()> {
        let filenames = match self.device_filenames() {
            Ok(names) => names.to_vec(),
            Err(e) => {
                eprintln!("{}", t!("report.device_list_failed", error = e).red());
                Vec::new()
            }
        };

        for file_name in &filenames {
            if let Err(e) = self.merge_device(store, file_name) {
                eprintln!(
                    "{}",
                    t!("report.device_merge_failed", name = file_name, error = e).red()
                );
            }
        }

        let mut root = ResultTree::named(&self.name);
        for file_name in &filenames {
            let path = self.config.outputdir.join(file_name);
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

        let final_path = self.config.outputdir.join(DEVICE_REPORT_FILE);
        store.save(&root, &final_path)?;
        println!("{}", t!("report.writing_report", path = final_path.display()));
        writer.write_report(
            &final_path,
            &self.config.outputdir,
            &ReportOptions::log_only(DEVICE_LOG_FILE, self.config.suite_stat_level),
        )
    }
}

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}
