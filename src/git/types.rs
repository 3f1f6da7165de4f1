// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Value types shared by the state manager and its collaborators.
//!
//! All of these compare by value; the manager relies on that to suppress
//! duplicate change notifications.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A configured remote (`[remote "<name>"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigRemote {
    pub name: String,
    pub url: String,
}

impl ConfigRemote {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for ConfigRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

/// A branch, local or remote-tracking.
///
/// Local branches carry `remote` when their config tracks a configured
/// remote; remote-tracking branches always carry their owning remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigBranch {
    /// Slash-separated name, e.g. `feature/x`.
    pub name: String,
    pub remote: Option<ConfigRemote>,
}

impl ConfigBranch {
    /// A branch with no tracking information.
    pub fn untracked(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote: None,
        }
    }

    pub fn tracking(name: impl Into<String>, remote: ConfigRemote) -> Self {
        Self {
            name: name.into(),
            remote: Some(remote),
        }
    }

    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.remote.is_some()
    }
}

impl fmt::Display for ConfigBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.remote {
            Some(remote) => write!(f, "{} -> {}", self.name, remote.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A file lock held on the server (git-lfs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryLock {
    pub id: String,
    pub path: PathBuf,
    pub owner: String,
    pub locked_at: String,
}

impl fmt::Display for RepositoryLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} locked by {}", self.path.display(), self.owner)
    }
}

/// One changed path in the working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub path: PathBuf,
    /// Rename or copy source.
    pub original_path: Option<PathBuf>,
    /// Porcelain `X` column (index).
    pub index: char,
    /// Porcelain `Y` column (work tree).
    pub work_tree: char,
}

impl StatusEntry {
    #[must_use]
    pub const fn is_staged(&self) -> bool {
        !matches!(self.index, ' ' | '?' | '!')
    }

    #[must_use]
    pub const fn is_untracked(&self) -> bool {
        self.index == '?'
    }
}

/// Point-in-time snapshot of working tree changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStatus {
    pub local_branch: Option<String>,
    pub remote_branch: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub entries: Vec<StatusEntry>,
}

impl RepositoryStatus {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Committer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitUser {
    pub name: String,
    pub email: String,
}

impl fmt::Display for GitUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Identity of an opened repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub local_path: PathBuf,
    pub name: String,
    /// Owner on the canonical host, if a remote points there.
    pub owner: Option<String>,
    /// URL of the remote on the canonical host.
    pub clone_url: Option<String>,
    pub user: GitUser,
}
