// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use crate::cli::{Cli, Command};
use clap::Parser;

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["gitstate", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "gitstate",
        "-l",
        "4",
        "--config",
        "a.toml",
        "-c",
        "b.toml",
        "--set",
        "status.debounce_ms=0",
        "--log-file",
        "gitstate.log",
        "options",
    ])
    .unwrap();

    assert_eq!(cli.global.log_level, Some(4));
    assert_eq!(
        cli.global.configs,
        vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]
    );
    assert_eq!(cli.global.overrides, vec!["status.debounce_ms=0"]);
    assert_eq!(cli.global.log_file, Some(PathBuf::from("gitstate.log")));
    assert!(!cli.global.no_default_config);
    assert!(matches!(cli.command, Some(Command::Options)));
}

#[test]
fn test_log_level_out_of_range_is_rejected() {
    assert!(Cli::try_parse_from(["gitstate", "-l", "6", "version"]).is_err());
}

#[test]
fn test_parse_watch_defaults_to_current_directory() {
    let cli = Cli::try_parse_from(["gitstate", "watch"]).unwrap();
    let Some(Command::Watch(args)) = cli.command else {
        panic!("expected watch command");
    };
    assert_eq!(args.repo.path, PathBuf::from("."));
    assert!(!args.no_watcher);
}

#[test]
fn test_parse_branches_with_remote() {
    let cli = Cli::try_parse_from(["gitstate", "branches", "/work/repo", "-r"]).unwrap();
    let Some(Command::Branches(args)) = cli.command else {
        panic!("expected branches command");
    };
    assert_eq!(args.repo.path, PathBuf::from("/work/repo"));
    assert!(args.remote);
}

#[test]
fn test_parse_no_command() {
    let cli = Cli::try_parse_from(["gitstate"]).unwrap();
    assert!(cli.command.is_none());
}
