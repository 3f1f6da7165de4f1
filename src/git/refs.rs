// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch and remote derivation from on-disk refs plus parsed config.
//!
//! ```text
//! refs/heads/a/b/c          --> local  "a/b/c"   (+ tracking config)
//! refs/remotes/origin/x/y   --> remote "origin" { "x/y" }
//!
//! HEAD "ref: refs/heads/x"  --> active branch "x"
//! HEAD "<40 hex>"           --> detached, no active branch
//!
//! active remote: tracking remote > default remote > first remote > none
//! ```

use std::collections::BTreeMap;
use std::path::{Component, Path};

use tracing::{trace, warn};

use crate::utility::fs::walk::{WalkOptions, parallel_walk};

use super::config_store::ConfigStore;
use super::paths::RepositoryPaths;
use super::types::{ConfigBranch, ConfigRemote};

/// Prefix of a symbolic HEAD.
pub const SYMBOLIC_REF_PREFIX: &str = "ref:";

/// Namespace of local branches.
pub const HEADS_PREFIX: &str = "refs/heads/";

/// Local branches keyed by name.
pub type LocalBranches = BTreeMap<String, ConfigBranch>;

/// Remote-tracking branches keyed by remote name, then branch name.
pub type RemoteBranches = BTreeMap<String, BTreeMap<String, ConfigBranch>>;

/// Names of every leaf ref file under `dir`, components joined with `/`.
///
/// A missing directory yields no names. Lock files left by an in-progress
/// ref update are skipped.
#[must_use]
pub fn leaf_ref_names(dir: &Path) -> Vec<String> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let walk = match parallel_walk(dir, &WalkOptions::for_git_metadata()) {
        Ok(walk) => walk,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to enumerate refs");
            return Vec::new();
        }
    };

    if walk.error_count() > 0 {
        warn!(
            dir = %dir.display(),
            errors = walk.error_count(),
            "ref scan incomplete, unreadable entries skipped"
        );
    }

    let mut names: Vec<String> = walk
        .into_files()
        .iter()
        .filter_map(|file| ref_name_under(dir, file))
        .filter(|name| !name.ends_with(".lock"))
        .collect();
    names.sort();
    names
}

/// Ref name of `file` relative to `dir`, or `None` if it lies elsewhere.
#[must_use]
pub fn ref_name_under(dir: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(dir).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Local branch map: one entry per leaf under the branches directory,
/// carrying tracking config when a `[branch]` section matches exactly.
#[must_use]
pub fn load_local_branches(paths: &RepositoryPaths, config: &dyn ConfigStore) -> LocalBranches {
    let tracked: BTreeMap<String, ConfigBranch> = config
        .branches()
        .into_iter()
        .map(|b| (b.name.clone(), b))
        .collect();

    leaf_ref_names(paths.branches_dir())
        .into_iter()
        .map(|name| {
            let branch = tracked
                .get(&name)
                .cloned()
                .unwrap_or_else(|| ConfigBranch::untracked(name.clone()));
            (name, branch)
        })
        .collect()
}

/// Remote branch map: for every configured remote with a directory under
/// the remotes path, its leaf refs. The symbolic `HEAD` leaf is skipped.
#[must_use]
pub fn load_remote_branches(paths: &RepositoryPaths, config: &dyn ConfigStore) -> RemoteBranches {
    let mut result = RemoteBranches::new();

    for remote in config.remotes() {
        let dir = paths.remotes_dir().join(&remote.name);
        if !dir.is_dir() {
            trace!(remote = %remote.name, "no remote-tracking refs");
            continue;
        }

        let branches = leaf_ref_names(&dir)
            .into_iter()
            .filter(|name| name != "HEAD")
            .map(|name| {
                let branch = ConfigBranch::tracking(name.clone(), remote.clone());
                (name, branch)
            })
            .collect();
        result.insert(remote.name.clone(), branches);
    }

    result
}

/// Read HEAD, returning its trimmed content, or `None` if unreadable.
#[must_use]
pub fn read_head(paths: &RepositoryPaths) -> Option<String> {
    std::fs::read_to_string(paths.head_file())
        .ok()
        .map(|content| content.trim().to_string())
}

/// Branch name HEAD points at, or `None` when detached.
#[must_use]
pub fn head_branch_name(head: &str) -> Option<&str> {
    let target = head.trim().strip_prefix(SYMBOLIC_REF_PREFIX)?.trim();
    target
        .strip_prefix(HEADS_PREFIX)
        .filter(|name| !name.is_empty())
}

/// The active branch for `head`, with tracking data from config.
#[must_use]
pub fn active_branch(head: Option<&str>, config: &dyn ConfigStore) -> Option<ConfigBranch> {
    let name = head_branch_name(head?)?;
    Some(
        config
            .branch(name)
            .unwrap_or_else(|| ConfigBranch::untracked(name)),
    )
}

/// The active remote: the active branch's tracked remote, else
/// `default_remote` if configured, else the first configured remote.
#[must_use]
pub fn active_remote(
    branch: Option<&ConfigBranch>,
    config: &dyn ConfigStore,
    default_remote: &str,
) -> Option<ConfigRemote> {
    if let Some(remote) = branch.and_then(|b| b.remote.clone()) {
        return Some(remote);
    }

    let remotes = config.remotes();
    remotes
        .iter()
        .find(|r| r.name == default_remote)
        .or_else(|| remotes.first())
        .cloned()
}
