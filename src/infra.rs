//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the suite runner:
//! the external runner process adapter, file system helpers and i18n
//! support.
//!
//! 此模块为套件运行器提供基础设施服务：
//! 外部运行器进程适配器、文件系统辅助功能和国际化支持。

pub mod fs;
pub mod process;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
