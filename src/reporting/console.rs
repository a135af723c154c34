//! # Console Reporting Module / 控制台报告模块
//!
//! Startup banners and the final per-job summary table, printed with color
//! coding and internationalized labels.
//!
//! 启动横幅和最终的每作业摘要表格，使用颜色编码和国际化标签打印。

use colored::*;
use std::sync::Arc;

use crate::core::config::{RunConfig, config_as_json};
use crate::core::models::{Device, Job};
use crate::infra::t;

/// Prints the effective configuration as pretty JSON, so a console capture
/// of a run records exactly what it ran with.
pub fn print_config(config: &RunConfig) {
    println!("{}", t!("run.config_banner").bold());
    match config_as_json(config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{}", e.to_string().red()),
    }
}

/// Prints the loaded device matrix, one JSON record per device.
pub fn print_devices(devices: &[Device]) {
    println!("{}", t!("run.devices_banner").bold());
    for device in devices {
        match serde_json::to_string_pretty(device) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}", e.to_string().red()),
        }
    }
}

/// Prints a formatted summary of every job after the batch finished.
///
/// # Output Format / 输出格式
/// ```text
/// --- Suite Summary ---
///   - passed       | login on pixel-8           |      12/12      3.21s
///   - 3 failed     | checkout on iphone-15      |       9/12     10.02s  (rerun)
/// ```
pub fn print_summary(jobs: &[Arc<Job>]) {
    println!("\n{}", t!("report.summary_banner").bold());

    for job in jobs {
        let (status, score, duration, rerun) = match job.outcome() {
            Some(outcome) => {
                let status = if outcome.is_pass() {
                    t!("report.status_passed").to_string().green()
                } else {
                    t!("report.status_failed", count = outcome.failed)
                        .to_string()
                        .red()
                };
                let score = match job.cached_test_count() {
                    Some(total) => {
                        format!("{}/{}", total.saturating_sub(outcome.failed), total)
                    }
                    None => String::new(),
                };
                let rerun = if outcome.attempts > 1 {
                    format!("  ({})", t!("report.rerun_marker"))
                } else {
                    String::new()
                };
                (
                    status,
                    score,
                    format!("{:.2?}", outcome.duration),
                    rerun,
                )
            }
            None => (
                t!("report.status_not_run").to_string().dimmed(),
                String::new(),
                "N/A".to_string(),
                String::new(),
            ),
        };

        println!(
            "  - {:<14} | {:<40} | {:>9} {:>10}{}",
            status,
            job.to_string(),
            score,
            duration,
            rerun
        );
    }
}
