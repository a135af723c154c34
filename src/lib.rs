//! # Suite Runner Library / Suite Runner 库
//!
//! This library provides the core functionality of the suite-runner tool:
//! it fans a set of Robot Framework test suites out across a device
//! matrix, runs the resulting jobs under a bounded pool of external runner
//! processes, and merges the many result files into two hierarchical
//! reports.
//!
//! 此库为 suite-runner 工具提供核心功能：
//! 它将一组 Robot Framework 测试套件分发到设备矩阵上，
//! 在受限的外部运行器进程池中运行由此产生的作业，
//! 并将大量结果文件合并为两个层级报告。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration, job planning and execution
//! - `infra` - Infrastructure services like the runner process adapter
//! - `reporting` - Result aggregation and report rendering
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、配置、作业规划和执行
//! - `infra` - 基础设施服务，如运行器进程适配器
//! - `reporting` - 结果聚合和报告渲染
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::execution;
pub use crate::core::models;

/// Initializes the application's internationalization (i18n) based on the
/// system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for the application's user interface. It attempts to match the
/// full locale (e.g., "zh-CN"), then just the language code (e.g., "en"),
/// and finally falls back to the default language ("en").
pub fn init() {
    // Detect system locale and set it for i18n.
    // Fallback to "en" if detection fails.
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    // Try to match the full locale first (e.g., "zh-CN")
    // Then try to match the language part only (e.g., "en" from "en-US")
    // Finally, fall back to "en"
    let lang = if available_locales.contains(&locale.as_str()) {
        &locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
