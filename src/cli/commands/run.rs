//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command: it wires the planner, the
//! executor and both report aggregators together. Configuration problems
//! surface here before anything touches the output directory; test-level
//! failures never change the exit status.
//!
//! 此模块实现 `run` 命令：它将规划器、执行器和两个报告聚合器
//! 连接在一起。配置问题会在任何组件接触输出目录之前在此浮现；
//! 测试级别的失败绝不会改变退出状态。

use anyhow::{Context, Result};
use std::fs;
use std::sync::Arc;

use crate::core::{
    config::{self, RunConfig},
    execution::SuiteExecutor,
    planner,
};
use crate::infra::process::ProcessTestRunner;
use crate::reporting::{
    DeviceLogTree, HtmlResultWriter, SuiteLogTree, XmlResultStore, console,
};

/// Executes the run command with the assembled configuration.
///
/// # Flow / 流程
/// 1. Load the device matrix (or the `--local` shortcut). Every
///    configuration error fires here, before any directory is created.
/// 2. Print the configuration and device banners.
/// 3. Expand the suite paths and build the job matrix.
/// 4. Run the batch under the configured concurrency limit.
/// 5. Merge the artifacts into the suite-grouped and device-grouped
///    reports and print the final summary.
pub async fn execute(config: RunConfig) -> Result<()> {
    let config = Arc::new(config);

    let devices = config::load_device_list(&config)?;

    console::print_config(&config);
    console::print_devices(&devices);

    let jobs = planner::build_jobs(&config, devices)?;

    fs::create_dir_all(&config.outputdir).with_context(|| {
        format!(
            "cannot create output directory {}",
            config.outputdir.display()
        )
    })?;

    let runner = Arc::new(ProcessTestRunner::from_command(&config.runner_command)?);
    let executor = SuiteExecutor::new(jobs.clone(), Arc::clone(&config), runner);
    executor.run_all().await?;

    let store = XmlResultStore;
    let writer = HtmlResultWriter::new(XmlResultStore);

    SuiteLogTree::new(&jobs, config.top_level_name.as_str(), Arc::clone(&config))
        .write(&store, &writer)?;
    DeviceLogTree::new(&jobs, config.top_level_name.as_str(), Arc::clone(&config))
        .write(&store, &writer)?;

    console::print_summary(&jobs);
    Ok(())
}
