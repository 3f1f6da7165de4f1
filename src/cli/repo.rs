// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for commands that operate on one repository.

use clap::Args;
use std::path::PathBuf;

/// A repository working tree.
#[derive(Debug, Clone, Args)]
pub struct RepoArgs {
    /// Working tree root.
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

/// Arguments for the watch command.
#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Loads the repository without starting the file watcher.
    #[arg(long = "no-watcher")]
    pub no_watcher: bool,
}

/// Arguments for the branches command.
#[derive(Debug, Clone, Args)]
pub struct BranchesArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Also lists remote-tracking branches.
    #[arg(short = 'r', long = "remote")]
    pub remote: bool,
}
