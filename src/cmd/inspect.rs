// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! One-shot inspection commands: `branches` and `status`.

use crate::cli::repo::{BranchesArgs, RepoArgs};
use crate::config::Settings;
use crate::error::Result;
use crate::git::refs::{LocalBranches, RemoteBranches};
use crate::git::types::{ConfigBranch, RepositoryStatus};

use super::open_repository;

/// Main handler for the branches command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or loaded.
pub async fn run_branches_command(args: &BranchesArgs, settings: &Settings) -> Result<()> {
    let manager = open_repository(&args.repo.path, settings).await?;
    let remote = args.remote.then(|| manager.remote_branches());

    let lines = format_branches(
        &manager.local_branches(),
        remote.as_ref(),
        manager.current_branch().as_ref(),
    );
    manager.dispose();

    if lines.is_empty() {
        println!("No branches found");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Main handler for the status command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or `git status`
/// fails.
pub async fn run_status_command(args: &RepoArgs, settings: &Settings) -> Result<()> {
    let manager = open_repository(&args.path, settings).await?;
    let status = manager.status().await;
    manager.dispose();

    for line in format_status(&status?) {
        println!("{line}");
    }
    Ok(())
}

/// One line per branch, the active one marked with `*`.
#[must_use]
pub fn format_branches(
    local: &LocalBranches,
    remote: Option<&RemoteBranches>,
    current: Option<&ConfigBranch>,
) -> Vec<String> {
    let current = current.map(|b| b.name.as_str());
    let mut lines: Vec<String> = local
        .iter()
        .map(|(name, branch)| {
            let marker = if current == Some(name.as_str()) { '*' } else { ' ' };
            format!("{marker} {branch}")
        })
        .collect();

    for (remote, branches) in remote.into_iter().flatten() {
        lines.extend(branches.keys().map(|name| format!("  {remote}/{name}")));
    }
    lines
}

/// Porcelain-like rendering: a `##` header, then one `XY path` line per
/// entry.
#[must_use]
pub fn format_status(status: &RepositoryStatus) -> Vec<String> {
    let mut header = format!(
        "## {}",
        status.local_branch.as_deref().unwrap_or("HEAD (no branch)")
    );
    if let Some(upstream) = &status.remote_branch {
        header.push_str("...");
        header.push_str(upstream);
    }

    let mut divergence = Vec::new();
    if status.ahead > 0 {
        divergence.push(format!("ahead {}", status.ahead));
    }
    if status.behind > 0 {
        divergence.push(format!("behind {}", status.behind));
    }
    if !divergence.is_empty() {
        header.push_str(&format!(" [{}]", divergence.join(", ")));
    }

    let mut lines = vec![header];
    lines.extend(status.entries.iter().map(|entry| {
        let codes = format!("{}{}", entry.index, entry.work_tree);
        match &entry.original_path {
            Some(original) => format!(
                "{codes} {} -> {}",
                original.display(),
                entry.path.display()
            ),
            None => format!("{codes} {}", entry.path.display()),
        }
    }));
    lines
}
