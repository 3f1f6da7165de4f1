// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Logging --> Settings --> Command Dispatch
//!   Watch | Branches | Status | Options | Configs | Version
//! ```

use std::process::ExitCode;

use gitstate::cli::global::GlobalOptions;
use gitstate::cli::{self, Command};
use gitstate::cmd::config::{run_configs_command, run_options_command};
use gitstate::cmd::inspect::{run_branches_command, run_status_command};
use gitstate::cmd::watch::run_watch_command;
use gitstate::config::Settings;
use gitstate::config::loader::ConfigLoader;
use gitstate::logging::init_logging;
use gitstate::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_CONFIG_FILE: &str = "gitstate.toml";
const ENV_PREFIX: &str = "GITSTATE";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let log_config = build_log_config(&cli.global);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli).await
}

fn build_log_config(global: &GlobalOptions) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(LogLevel::INFO);

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(console_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .build()
}

async fn dispatch_command(cli: &cli::Cli) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options) => {
            load_settings(&cli.global).map(|settings| run_options_command(&settings))
        }
        Some(Command::Configs) => build_config_loader(&cli.global).map(|loader| {
            run_configs_command(&loader.format_loaded_files());
        }),
        Some(Command::Watch(args)) => match load_settings(&cli.global) {
            Ok(settings) => run_watch_command(args, &settings).await,
            Err(e) => Err(e),
        },
        Some(Command::Branches(args)) => match load_settings(&cli.global) {
            Ok(settings) => run_branches_command(args, &settings).await,
            Err(e) => Err(e),
        },
        Some(Command::Status(args)) => match load_settings(&cli.global) {
            Ok(settings) => run_status_command(args, &settings).await,
            Err(e) => Err(e),
        },
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> gitstate::error::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        loader = loader.add_toml_file_optional(DEFAULT_CONFIG_FILE);
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);
    for assignment in &global.overrides {
        loader = loader.set_assignment(assignment)?;
    }
    Ok(loader)
}

fn load_settings(global: &GlobalOptions) -> gitstate::error::Result<Settings> {
    build_config_loader(global)?.build().map_err(|e| {
        eprintln!("Failed to load settings: {e}");
        e
    })
}
