//! # CLI Tests / CLI 测试
//!
//! End-to-end tests of the `suite-runner` binary. The full-run test drives
//! the real process pipeline against a stub runner script that mimics the
//! Robot Framework CLI contract.
//!
//! `suite-runner` 二进制文件的端到端测试。完整运行测试使用模拟
//! Robot Framework CLI 约定的桩运行器脚本驱动真实的进程流水线。

mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("suite-runner").unwrap();
    cmd.arg("--lang").arg("en");
    cmd
}

#[test]
fn bare_invocation_shows_usage() {
    Command::cargo_bin("suite-runner")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_both_subcommands() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn run_with_a_missing_devices_file_fails_with_a_configuration_error() {
    let sandbox = common::sandbox();
    common::write_suite(&sandbox.path().join("suites"), "login");

    bin()
        .current_dir(sandbox.path())
        .arg("run")
        .arg("--devices")
        .arg("missing.json")
        .arg("suites")
        .assert()
        .failure()
        .stderr(predicate::str::contains("devices file"));
}

#[test]
fn init_scaffolds_a_devices_file_and_refuses_to_overwrite() {
    let sandbox = common::sandbox();

    bin()
        .current_dir(sandbox.path())
        .arg("init")
        .arg("--non-interactive")
        .assert()
        .success();

    let path = sandbox.path().join("devices.json");
    let content = fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert!(parsed.get("devices").unwrap().as_array().unwrap().len() >= 2);

    // Second invocation without --force leaves the file untouched.
    bin()
        .current_dir(sandbox.path())
        .arg("init")
        .arg("--non-interactive")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
}

/// A POSIX shell stand-in for the external runner: it honors `--name`,
/// `--output` and `--outputdir` and writes one passing-test artifact.
#[cfg(unix)]
const STUB_RUNNER: &str = r#"#!/bin/sh
NAME=suite
OUTPUT=output.xml
OUTDIR=.
while [ $# -gt 0 ]; do
  case "$1" in
    --name) NAME="$2"; shift 2 ;;
    --output) OUTPUT="$2"; shift 2 ;;
    --outputdir) OUTDIR="$2"; shift 2 ;;
    --loglevel|--log|--report|--variable|--test|--include) shift 2 ;;
    --dryrun) shift ;;
    *) shift ;;
  esac
done
case "$OUTPUT" in
  /*) DEST="$OUTPUT" ;;
  *) DEST="$OUTDIR/$OUTPUT" ;;
esac
mkdir -p "$(dirname "$DEST")"
cat > "$DEST" <<EOF
<?xml version="1.0" encoding="UTF-8"?>
<robot generator="stub">
<suite name="$NAME">
<test name="stub case"><status status="PASS"/></test>
</suite>
</robot>
EOF
echo "ran $NAME"
exit 0
"#;

#[cfg(unix)]
#[test]
fn a_full_run_produces_both_reports() {
    let sandbox = common::sandbox();
    let suites = sandbox.path().join("suites");
    common::write_suite(&suites, "checkout");
    common::write_suite(&suites, "login");
    common::write_devices_file(&sandbox.path().join("devices.json"), &["d1", "d2"]);

    let stub = sandbox.path().join("stub_runner.sh");
    fs::write(&stub, STUB_RUNNER).unwrap();

    bin()
        .current_dir(sandbox.path())
        .arg("run")
        .arg("--runner")
        .arg(format!("sh {}", stub.display()))
        .arg("--outputdir")
        .arg("results")
        .arg("suites")
        .assert()
        .success()
        .stdout(predicate::str::contains("total test suites finished: 4/4"));

    let results = sandbox.path().join("results");
    // Per-job artifacts and redirected console files.
    for suite in ["checkout", "login"] {
        for device in ["d1", "d2"] {
            assert!(results.join(suite).join(format!("{}.xml", device)).exists());
            assert!(results.join(suite).join(format!("{}.out", device)).exists());
            assert!(results.join(suite).join(format!("{}.err", device)).exists());
        }
        // Suite-grouped intermediate.
        assert!(results.join(format!("{}.xml", suite)).exists());
    }
    // Device-grouped intermediates.
    assert!(results.join("d1.xml").exists());
    assert!(results.join("d2.xml").exists());
    // Final artifacts and rendered reports.
    assert!(results.join("output.xml").exists());
    assert!(results.join("devices.xml").exists());
    assert!(results.join("log.html").exists());
    assert!(results.join("report.html").exists());
    assert!(results.join("devices.html").exists());
}
