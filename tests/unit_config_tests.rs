//! # Config Module Unit Tests / Config 模块单元测试
//!
//! Tests for the run configuration defaults and the device matrix loader,
//! including every configuration-error edge case.
//!
//! 运行配置默认值和设备矩阵加载器的测试，包括每个配置错误边界情况。

mod common;

use std::fs;

use suite_runner::core::config::{RunConfig, load_device_list};
use suite_runner::core::models::RunnerError;

fn expect_configuration_error(result: anyhow::Result<Vec<suite_runner::core::models::Device>>) {
    let err = result.expect_err("expected a configuration error");
    let runner_error = err
        .downcast_ref::<RunnerError>()
        .expect("expected a RunnerError");
    assert!(matches!(runner_error, RunnerError::Configuration(_)));
}

#[test]
fn defaults_match_the_documented_configuration() {
    let config = RunConfig::default();
    assert_eq!(config.loglevel, "DEBUG");
    assert!(config.max_processes >= 4);
    assert!(!config.local_device);
    assert_eq!(config.suite_stat_level, 3);
    assert!(config.debug_testcase.is_none());
    assert!(config.include_tags.is_none());
    assert!(!config.rerun_failed);
    assert_eq!(config.outputdir, std::path::PathBuf::from("results"));
    assert_eq!(config.runner_command, "robot");
}

#[test]
fn local_shortcut_yields_one_synthetic_device() {
    let config = RunConfig {
        local_device: true,
        // The file does not exist; the shortcut must not care.
        devices_file: "does-not-exist.json".into(),
        ..RunConfig::default()
    };
    let devices = load_device_list(&config).unwrap();
    assert_eq!(devices.len(), 1);
    assert!(devices[0].local_device);
    assert_eq!(devices[0].display_name(), "local");
}

#[test]
fn a_valid_devices_file_parses_names_and_attributes() {
    let sandbox = common::sandbox();
    let path = sandbox.path().join("devices.json");
    common::write_devices_file(&path, &["pixel-8", "iphone-15"]);

    let config = RunConfig {
        devices_file: path,
        ..RunConfig::default()
    };
    let devices = load_device_list(&config).unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].name, "pixel-8");
    assert_eq!(devices[1].attributes.get("browser").unwrap(), "chrome");
}

#[test]
fn a_missing_devices_file_is_a_configuration_error() {
    let sandbox = common::sandbox();
    let config = RunConfig {
        devices_file: sandbox.path().join("devices.json"),
        ..RunConfig::default()
    };
    let err = load_device_list(&config).expect_err("expected an error");
    assert!(err.to_string().contains("does not exist"));
    expect_configuration_error(load_device_list(&config));
}

#[test]
fn invalid_json_is_a_configuration_error() {
    let sandbox = common::sandbox();
    let path = sandbox.path().join("devices.json");
    fs::write(&path, "{\"devices\": [").unwrap();
    let config = RunConfig {
        devices_file: path,
        ..RunConfig::default()
    };
    expect_configuration_error(load_device_list(&config));
}

#[test]
fn an_empty_device_list_is_a_configuration_error() {
    let sandbox = common::sandbox();
    let path = sandbox.path().join("devices.json");
    fs::write(&path, "{\"devices\": []}").unwrap();
    let config = RunConfig {
        devices_file: path,
        ..RunConfig::default()
    };
    expect_configuration_error(load_device_list(&config));
}

#[test]
fn duplicate_device_names_are_a_configuration_error() {
    let sandbox = common::sandbox();
    let path = sandbox.path().join("devices.json");
    common::write_devices_file(&path, &["pixel-8", "pixel-8"]);
    let config = RunConfig {
        devices_file: path,
        ..RunConfig::default()
    };
    let err = load_device_list(&config).expect_err("expected an error");
    assert!(err.to_string().contains("duplicate device name"));
}
