// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for gitstate using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! gitstate [global options] <command>
//! watch [PATH]
//! branches [PATH] [--remote]
//! status [PATH]
//! options
//! configs
//! version
//! ```

pub mod global;
pub mod repo;

#[cfg(test)]
mod tests;

use crate::cli::global::GlobalOptions;
use crate::cli::repo::{BranchesArgs, RepoArgs, WatchArgs};
use clap::{Parser, Subcommand};

/// Repository state reconciliation core.
///
/// Keeps an in-memory model of a git repository in sync with disk.
#[derive(Debug, Parser)]
#[command(
    name = "gitstate",
    author,
    version,
    about = "Repository state reconciliation core",
    long_about = "gitstate-rs Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Tracks branches, remotes, HEAD and locks of a git repository\n\
                  and reports every change. `gitstate watch` follows a repository\n\
                  until interrupted; `gitstate <command> --help` describes the\n\
                  other commands.",
    after_help = "CONFIG FILES:\n\n\
                  gitstate reads `gitstate.toml` from the current directory when it\n\
                  exists, then every file given with --config, in order. Environment\n\
                  variables such as GITSTATE_STATUS__DEBOUNCE_MS override files, and\n\
                  --set section.key=value overrides everything. Use\n\
                  --no-default-config to skip `gitstate.toml`."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all settings and their values.
    Options,

    /// Lists the config files in use.
    Configs,

    /// Follows a repository and prints every change until Ctrl-C.
    Watch(WatchArgs),

    /// Lists local and remote-tracking branches.
    Branches(BranchesArgs),

    /// Runs one status check and prints it.
    Status(RepoArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
