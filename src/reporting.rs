//! # Reporting Module / 报告模块
//!
//! This module turns the per-job artifacts of a finished batch into the
//! two hierarchical reports: grouped by test suite and grouped by device.
//! It also hosts the result store and writer seams plus the console
//! summary.
//!
//! 此模块将已完成批次的每作业产物转化为两个层级报告：
//! 按测试套件分组和按设备分组。它还承载结果存储与写入器接缝
//! 以及控制台摘要。

pub mod console;
pub mod device_tree;
pub mod html;
pub mod model;
pub mod suite_tree;

// Re-export common reporting types
pub use device_tree::DeviceLogTree;
pub use html::HtmlResultWriter;
pub use model::{ReportOptions, ResultStore, ResultTree, ResultWriter, XmlResultStore};
pub use suite_tree::SuiteLogTree;
