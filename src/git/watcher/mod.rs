// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Change watcher contract and filesystem path classification.
//!
//! ```text
//! OS event (path)
//!      |
//!      v
//!  classify() --> PathKind
//!      |            Head | Index | Config
//!      |            LocalRef(name) | RemoteRef{remote, name}
//!      |            WorkTree | Ignored
//!      v
//!  KnownRefs (created / changed / deleted)
//!      |
//!      v
//!  WatchEvent --> flume::Sender --> RepositoryManager
//! ```

mod native;

pub use native::NotifyWatcher;

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::StateResult;
use crate::git::paths::RepositoryPaths;
use crate::git::refs::{leaf_ref_names, ref_name_under};

/// Change notifications raised by a [`ChangeWatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// HEAD was rewritten; carries its new trimmed contents.
    HeadChanged { contents: String },
    IndexChanged,
    ConfigChanged,
    /// A local branch ref's target moved.
    LocalBranchChanged(String),
    LocalBranchCreated(String),
    LocalBranchDeleted(String),
    RemoteBranchCreated { remote: String, name: String },
    RemoteBranchDeleted { remote: String, name: String },
    /// Something in the working tree changed.
    RepositoryChanged,
}

/// Source of repository change events.
///
/// `start` and `stop` are idempotent: starting a running watcher or
/// stopping a stopped one does nothing.
pub trait ChangeWatcher: Send + Sync {
    /// Attach the event sink. Must precede `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be prepared.
    fn initialize(&self, sink: flume::Sender<WatchEvent>) -> StateResult<()>;

    /// # Errors
    ///
    /// Returns an error if the underlying watch cannot be established.
    fn start(&self) -> StateResult<()>;

    fn stop(&self);

    fn is_running(&self) -> bool;

    /// Stop and release all resources. Further `start` calls fail.
    fn dispose(&self);
}

/// What a changed path means to the repository model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKind {
    Head,
    Index,
    Config,
    LocalRef(String),
    RemoteRef { remote: String, name: String },
    WorkTree,
    Ignored,
}

/// Classify a changed path against the repository layout.
#[must_use]
pub fn classify(paths: &RepositoryPaths, path: &Path) -> PathKind {
    let in_git_dir = path.starts_with(paths.git_dir());
    if !in_git_dir {
        return if path.starts_with(paths.work_tree()) {
            PathKind::WorkTree
        } else {
            PathKind::Ignored
        };
    }

    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("lock"))
    {
        return PathKind::Ignored;
    }

    if path == paths.head_file() {
        return PathKind::Head;
    }
    if path == paths.index_file() {
        return PathKind::Index;
    }
    if path == paths.config_file() {
        return PathKind::Config;
    }

    if let Some(name) = ref_name_under(paths.branches_dir(), path) {
        return PathKind::LocalRef(name);
    }

    if let Some(full) = ref_name_under(paths.remotes_dir(), path) {
        return match full.split_once('/') {
            Some((_, "HEAD")) | None => PathKind::Ignored,
            Some((remote, name)) => PathKind::RemoteRef {
                remote: remote.to_string(),
                name: name.to_string(),
            },
        };
    }

    PathKind::Ignored
}

/// Ref leaves seen so far, used to tell creation from update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownRefs {
    local: BTreeSet<String>,
    /// `<remote>/<name>`
    remote: BTreeSet<String>,
}

impl KnownRefs {
    /// Snapshot the refs currently on disk.
    #[must_use]
    pub fn scan(paths: &RepositoryPaths) -> Self {
        Self {
            local: leaf_ref_names(paths.branches_dir()).into_iter().collect(),
            remote: leaf_ref_names(paths.remotes_dir()).into_iter().collect(),
        }
    }

    /// Event for `kind`, given whether the path now exists as a file.
    ///
    /// Updates the known set as a side effect.
    pub fn event_for(&mut self, kind: PathKind, exists: bool) -> Option<WatchEvent> {
        match kind {
            PathKind::Index => Some(WatchEvent::IndexChanged),
            PathKind::Config => Some(WatchEvent::ConfigChanged),
            PathKind::WorkTree => Some(WatchEvent::RepositoryChanged),
            PathKind::LocalRef(name) => {
                if exists {
                    if self.local.insert(name.clone()) {
                        Some(WatchEvent::LocalBranchCreated(name))
                    } else {
                        Some(WatchEvent::LocalBranchChanged(name))
                    }
                } else if self.local.remove(&name) {
                    Some(WatchEvent::LocalBranchDeleted(name))
                } else {
                    None
                }
            }
            PathKind::RemoteRef { remote, name } => {
                let key = format!("{remote}/{name}");
                if exists {
                    self.remote
                        .insert(key)
                        .then_some(WatchEvent::RemoteBranchCreated { remote, name })
                } else {
                    self.remote
                        .remove(&key)
                        .then_some(WatchEvent::RemoteBranchDeleted { remote, name })
                }
            }
            // HEAD needs its contents; the caller reads the file
            PathKind::Head | PathKind::Ignored => None,
        }
    }
}
