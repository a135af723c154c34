// Shared test helpers for integration tests
#![allow(dead_code)]

use anyhow::Result;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{TempDir, tempdir};

use suite_runner::core::config::RunConfig;
use suite_runner::core::execution::{OutputSinks, TestRunner};
use suite_runner::core::models::{Device, Job};
use suite_runner::core::planner;
use suite_runner::reporting::model::{ResultStore, ResultTree, TestLeaf, XmlResultStore};

pub fn sandbox() -> TempDir {
    tempdir().expect("failed to create temporary directory")
}

/// Writes a minimal suite definition file and returns its path.
pub fn write_suite(dir: &Path, name: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("failed to create suites directory");
    let path = dir.join(format!("{}.robot", name));
    let content = "*** Test Cases ***\nExample Case\n    Log    hello\n";
    fs::write(&path, content).expect("failed to write suite file");
    path
}

/// A device with a couple of plausible mobile-web attributes.
pub fn device(name: &str) -> Device {
    let mut attributes = BTreeMap::new();
    attributes.insert("os_type".to_string(), "android".to_string());
    attributes.insert("browser".to_string(), "chrome".to_string());
    Device {
        name: name.to_string(),
        local_device: false,
        attributes,
    }
}

pub fn write_devices_file(path: &Path, names: &[&str]) {
    let devices: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "name": name,
                "os_type": "android",
                "browser": "chrome"
            })
        })
        .collect();
    let document = serde_json::json!({ "devices": devices });
    fs::write(path, serde_json::to_string_pretty(&document).unwrap())
        .expect("failed to write devices file");
}

/// A configuration rooted inside the sandbox, with suites under
/// `<root>/suites` and output under `<root>/results`.
pub fn config_for(root: &Path) -> RunConfig {
    RunConfig {
        outputdir: root.join("results"),
        devices_file: root.join("devices.json"),
        test_file_paths: vec![root.join("suites")],
        ..RunConfig::default()
    }
}

/// Expands the sandbox suites and crosses them with the given devices.
pub fn make_jobs(config: &Arc<RunConfig>, devices: Vec<Device>) -> Vec<Arc<Job>> {
    planner::build_jobs(config, devices).expect("failed to build job matrix")
}

/// Writes a per-job result artifact the way the real runner would: a root
/// suite named after the device holding `total` test cases, the first
/// `failed` of them failing.
pub fn write_job_artifact(job: &Job, total: usize, failed: usize) -> Result<()> {
    fs::create_dir_all(job.output_dir())?;
    write_artifact(&job.output_path(), job.display_name(), total, failed)
}

pub fn write_artifact(path: &Path, root_name: &str, total: usize, failed: usize) -> Result<()> {
    let mut root = ResultTree::named(root_name);
    for index in 0..total {
        let fails = index < failed;
        root.tests.push(TestLeaf {
            name: format!("case {}", index + 1),
            passed: !fails,
            message: fails.then(|| "expected 200, got 500".to_string()),
        });
    }
    XmlResultStore.save(&root, path)
}

/// An in-process `TestRunner` double.
///
/// It records every run, tracks how many runs are active at once (to prove
/// the concurrency bound), optionally writes a realistic artifact, and can
/// simulate a dispatch failure for one suite.
pub struct MockRunner {
    pub test_count: usize,
    pub fail_first: usize,
    pub fail_second: usize,
    pub delay: Duration,
    pub write_artifacts: bool,
    pub dispatch_error_for: Option<String>,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub runs: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn passing(test_count: usize) -> Self {
        Self {
            test_count,
            fail_first: 0,
            fail_second: 0,
            delay: Duration::ZERO,
            write_artifacts: true,
            dispatch_error_for: None,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            runs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(test_count: usize, fail_first: usize, fail_second: usize) -> Self {
        Self {
            fail_first,
            fail_second,
            ..Self::passing(test_count)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_dispatch_error_for(mut self, suite: &str) -> Self {
        self.dispatch_error_for = Some(suite.to_string());
        self
    }

    pub fn total_runs(&self) -> usize {
        self.runs.lock().unwrap().len()
    }

    pub fn runs_for(&self, label: &str) -> usize {
        self.runs
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.as_str() == label)
            .count()
    }

    pub fn observed_max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl TestRunner for MockRunner {
    fn run<'a>(
        &'a self,
        job: &'a Job,
        _sinks: Option<OutputSinks>,
    ) -> BoxFuture<'a, Result<usize>> {
        Box::pin(async move {
            if let Some(suite) = &self.dispatch_error_for {
                if job.suite_name() == suite {
                    anyhow::bail!("mock dispatch failure");
                }
            }

            let label = job.to_string();
            let attempt = {
                let mut runs = self.runs.lock().unwrap();
                runs.push(label.clone());
                runs.iter().filter(|entry| **entry == label).count()
            };

            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now_active, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);

            let failed = if attempt > 1 {
                self.fail_second
            } else {
                self.fail_first
            };
            if self.write_artifacts {
                write_job_artifact(job, self.test_count, failed)?;
            }
            Ok(failed)
        })
    }

    fn count_tests<'a>(&'a self, _job: &'a Job) -> BoxFuture<'a, Result<usize>> {
        Box::pin(async move { Ok(self.test_count) })
    }
}
