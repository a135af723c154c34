//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which scaffolds a devices
//! file: either through a small interactive wizard or, with
//! `--non-interactive`, from a built-in example matrix.
//!
//! 此模块实现 `init` 命令，用于搭建设备文件：
//! 可以通过小型交互式向导，也可以使用 `--non-interactive`
//! 从内置的示例矩阵生成。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input};
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};

use crate::core::models::Device;
use crate::infra::t;

const DEFAULT_DEVICES: &str = r#"{
  "devices": [
    {
      "name": "pixel-8-chrome",
      "os_type": "android",
      "device": "Pixel 8",
      "os_version": "15",
      "browser": "chrome"
    },
    {
      "name": "iphone-15-safari",
      "os_type": "ios",
      "device": "iPhone 15",
      "os_version": "18",
      "browser": "safari"
    }
  ]
}
"#;

/// Executes the init command.
///
/// # Arguments
/// * `output` - Path for the new devices file
/// * `force` - Whether to overwrite an existing file
/// * `non_interactive` - Skip the wizard and write the built-in example
pub fn execute(output: PathBuf, force: bool, non_interactive: bool) -> Result<()> {
    // Check if file already exists
    if output.exists() && !force {
        println!("{}", t!("init.file_exists", path = output.display()).red());
        println!("{}", t!("init.use_force").yellow());
        return Ok(());
    }

    // Create parent directories if needed
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!("cannot create parent directory {}", parent.display())
            })?;
        }
    }

    let content = if non_interactive {
        DEFAULT_DEVICES.to_string()
    } else {
        wizard()?
    };

    fs::write(&output, content)
        .with_context(|| format!("cannot write devices file {}", output.display()))?;
    println!(
        "{}",
        t!("init.created", path = output.display()).green().bold()
    );
    Ok(())
}

/// Collects device records interactively until the user stops adding more.
fn wizard() -> Result<String> {
    let mut devices = Vec::new();
    loop {
        let name: String = Input::new()
            .with_prompt(t!("init.prompt_name").to_string())
            .interact_text()?;

        let mut attributes = BTreeMap::new();
        for (key, default) in [
            ("os_type", "android"),
            ("device", ""),
            ("os_version", ""),
            ("browser", "chrome"),
        ] {
            let value: String = Input::new()
                .with_prompt(t!("init.prompt_attribute", key = key).to_string())
                .default(default.to_string())
                .allow_empty(true)
                .interact_text()?;
            if !value.is_empty() {
                attributes.insert(key.to_string(), value);
            }
        }

        devices.push(Device {
            name,
            local_device: false,
            attributes,
        });

        let more = Confirm::new()
            .with_prompt(t!("init.prompt_add_another").to_string())
            .default(false)
            .interact()?;
        if !more {
            break;
        }
    }

    let document = serde_json::json!({ "devices": devices });
    Ok(serde_json::to_string_pretty(&document)? + "\n")
}
