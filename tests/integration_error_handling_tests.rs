//! # Error Handling Integration Tests / 错误处理集成测试
//!
//! Drives the `run` command wiring through its configuration-error paths
//! and checks that fatal errors fire before anything is written to disk.
//!
//! 通过配置错误路径驱动 `run` 命令的装配逻辑，并检查致命错误
//! 在任何内容写入磁盘之前触发。

mod common;

use suite_runner::cli::commands;
use suite_runner::core::config::RunConfig;
use suite_runner::core::models::RunnerError;

fn assert_configuration_error(err: &anyhow::Error) {
    assert!(matches!(
        err.downcast_ref::<RunnerError>(),
        Some(RunnerError::Configuration(_))
    ));
}

#[tokio::test]
async fn a_missing_devices_file_fails_before_any_output_exists() {
    let sandbox = common::sandbox();
    common::write_suite(&sandbox.path().join("suites"), "login");
    let config = common::config_for(sandbox.path());
    let outputdir = config.outputdir.clone();

    let err = commands::run::execute(config)
        .await
        .expect_err("expected a configuration error");
    assert_configuration_error(&err);
    assert!(err.to_string().contains("devices file"));
    assert!(!outputdir.exists());
}

#[tokio::test]
async fn an_unreadable_devices_file_fails_before_any_output_exists() {
    let sandbox = common::sandbox();
    common::write_suite(&sandbox.path().join("suites"), "login");
    let config = common::config_for(sandbox.path());
    std::fs::write(&config.devices_file, "definitely not json").unwrap();
    let outputdir = config.outputdir.clone();

    let err = commands::run::execute(config)
        .await
        .expect_err("expected a configuration error");
    assert_configuration_error(&err);
    assert!(!outputdir.exists());
}

#[tokio::test]
async fn missing_test_paths_fail_before_any_output_exists() {
    let sandbox = common::sandbox();
    let config = common::config_for(sandbox.path());
    common::write_devices_file(&config.devices_file, &["d1"]);
    let outputdir = config.outputdir.clone();

    let err = commands::run::execute(config)
        .await
        .expect_err("expected a configuration error");
    assert_configuration_error(&err);
    assert!(!outputdir.exists());
}

#[tokio::test]
async fn the_local_shortcut_skips_the_devices_file_entirely() {
    let sandbox = common::sandbox();
    // No devices file anywhere; only the suite paths are broken, so the
    // error must come from path expansion, not device loading.
    let config = RunConfig {
        local_device: true,
        max_processes: 1,
        ..common::config_for(sandbox.path())
    };

    let err = commands::run::execute(config)
        .await
        .expect_err("expected a configuration error");
    assert!(err.to_string().contains("test path"));
}
