// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository path resolution.
//!
//! ```text
//! <root>/
//!   .git/            directory, or file "gitdir: <path>" (linked worktree)
//!     HEAD
//!     index
//!     config
//!     refs/heads/    local branches
//!     refs/remotes/  remote-tracking branches
//! ```
//!
//! Nothing here validates: a root that is not a git working tree still
//! produces paths, they just do not exist.

use std::path::{Path, PathBuf};

/// Name of the metadata entry inside a working tree.
pub const DOT_GIT: &str = ".git";

/// Prefix of the pointer line in a linked worktree's `.git` file.
pub const GITDIR_PREFIX: &str = "gitdir:";

/// Canonical paths inside a repository, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPaths {
    work_tree: PathBuf,
    git_dir: PathBuf,
    branches_dir: PathBuf,
    remotes_dir: PathBuf,
    index_file: PathBuf,
    head_file: PathBuf,
    config_file: PathBuf,
}

impl RepositoryPaths {
    /// Resolve the paths for the working tree at `root`. A relative root
    /// is made absolute against the current directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let work_tree = std::path::absolute(&root).unwrap_or(root);
        let git_dir = resolve_git_dir(&work_tree);

        Self {
            branches_dir: git_dir.join("refs").join("heads"),
            remotes_dir: git_dir.join("refs").join("remotes"),
            index_file: git_dir.join("index"),
            head_file: git_dir.join("HEAD"),
            config_file: git_dir.join("config"),
            work_tree,
            git_dir,
        }
    }

    #[must_use]
    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// The metadata directory, after following a `gitdir:` pointer.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    #[must_use]
    pub fn branches_dir(&self) -> &Path {
        &self.branches_dir
    }

    #[must_use]
    pub fn remotes_dir(&self) -> &Path {
        &self.remotes_dir
    }

    #[must_use]
    pub fn index_file(&self) -> &Path {
        &self.index_file
    }

    #[must_use]
    pub fn head_file(&self) -> &Path {
        &self.head_file
    }

    #[must_use]
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Whether the metadata directory exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.git_dir.is_dir()
    }

    /// Whether the metadata directory lives outside the working tree.
    #[must_use]
    pub fn is_linked_worktree(&self) -> bool {
        !self.git_dir.starts_with(&self.work_tree)
    }
}

/// `<root>/.git` when it is a directory, else the target of its
/// `gitdir:` line. Unreadable pointer files fall back to `<root>/.git`.
fn resolve_git_dir(root: &Path) -> PathBuf {
    let dot_git = root.join(DOT_GIT);
    if !dot_git.is_file() {
        return dot_git;
    }

    std::fs::read_to_string(&dot_git)
        .ok()
        .and_then(|content| {
            content.lines().find_map(|line| {
                line.strip_prefix(GITDIR_PREFIX)
                    .map(str::trim)
                    .filter(|target| !target.is_empty())
                    .map(|target| root.join(target))
            })
        })
        .unwrap_or(dot_git)
}
