// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::{env, path::PathBuf};

use crate::core::config::{RunConfig, default_max_processes};
use crate::infra::t;

pub mod commands;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language() -> String {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        if let Some(lang) = args.get(pos + 1) {
            return lang.clone();
        }
    }
    // Fallback to system language detection
    sys_locale::get_locale().unwrap_or_else(|| "en".to_string())
}

fn build_cli(locale: &str) -> Command {
    Command::new("suite-runner")
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd_run_about", locale = locale).to_string())
                .arg(
                    Arg::new("max-processes")
                        .short('j')
                        .long("max-processes")
                        .help(t!("arg_max_processes", locale = locale).to_string())
                        .value_name("MAX_PROCESSES")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("loglevel")
                        .long("loglevel")
                        .help(t!("arg_loglevel", locale = locale).to_string())
                        .value_name("LOGLEVEL")
                        .default_value("DEBUG")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("local")
                        .long("local")
                        .help(t!("arg_local", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("devices")
                        .long("devices")
                        .help(t!("arg_devices", locale = locale).to_string())
                        .value_name("DEVICES")
                        .default_value("devices.json")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("top-level-name")
                        .long("top-level-name")
                        .help(t!("arg_top_level_name", locale = locale).to_string())
                        .value_name("NAME")
                        .default_value("Smoke Tests")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("suite-stat-level")
                        .long("suite-stat-level")
                        .help(t!("arg_suite_stat_level", locale = locale).to_string())
                        .value_name("LEVEL")
                        .default_value("3")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("test")
                        .long("test")
                        .help(t!("arg_test", locale = locale).to_string())
                        .value_name("TEST")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("include")
                        .long("include")
                        .help(t!("arg_include", locale = locale).to_string())
                        .value_name("TAG")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("rerun-failed")
                        .long("rerun-failed")
                        .help(t!("arg_rerun_failed", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("outputdir")
                        .long("outputdir")
                        .help(t!("arg_outputdir", locale = locale).to_string())
                        .value_name("OUTPUTDIR")
                        .default_value("results")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("runner")
                        .long("runner")
                        .help(t!("arg_runner", locale = locale).to_string())
                        .value_name("COMMAND")
                        .default_value("robot")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("test-paths")
                        .help(t!("arg_test_paths", locale = locale).to_string())
                        .value_name("TEST_PATHS")
                        .default_value("tests/")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("output")
                        .help(t!("arg_init_output", locale = locale).to_string())
                        .value_name("OUTPUT")
                        .default_value("devices.json")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("arg_init_force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help("Write a default devices file without launching the interactive wizard.")
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Builds the immutable run configuration from the parsed arguments. The
/// local shortcut forces a single process, exactly like a limit of 1 on
/// the command line would.
fn run_config_from_matches(matches: &clap::ArgMatches) -> RunConfig {
    let local_device = matches.get_flag("local");
    let max_processes = if local_device {
        1
    } else {
        matches
            .get_one::<usize>("max-processes")
            .copied()
            .unwrap_or_else(default_max_processes)
    };

    RunConfig {
        loglevel: matches.get_one::<String>("loglevel").unwrap().clone(), // Has default
        max_processes,
        local_device,
        top_level_name: matches.get_one::<String>("top-level-name").unwrap().clone(), // Has default
        suite_stat_level: *matches.get_one::<usize>("suite-stat-level").unwrap(), // Has default
        debug_testcase: matches.get_one::<String>("test").cloned(),
        include_tags: matches.get_one::<String>("include").cloned(),
        devices_file: matches.get_one::<PathBuf>("devices").unwrap().clone(), // Has default
        rerun_failed: matches.get_flag("rerun-failed"),
        outputdir: matches.get_one::<PathBuf>("outputdir").unwrap().clone(), // Has default
        runner_command: matches.get_one::<String>("runner").unwrap().clone(), // Has default
        test_file_paths: matches
            .get_many::<PathBuf>("test-paths")
            .unwrap() // Has default
            .cloned()
            .collect(),
    }
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let language = pre_parse_language();
    rust_i18n::set_locale(&language);

    let matches = build_cli(&language).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let config = run_config_from_matches(run_matches);
            commands::run::execute(config).await?;
        }
        Some(("init", init_matches)) => {
            let output = init_matches.get_one::<PathBuf>("output").unwrap().clone(); // Has default
            let force = init_matches.get_flag("force");
            let non_interactive = init_matches.get_flag("non-interactive");
            commands::init::execute(output, force, non_interactive)?;
        }
        _ => {
            // This case handles when no subcommand is given.
            // Clap will have already printed help info.
        }
    }
    Ok(())
}
