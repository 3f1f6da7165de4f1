// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory repository model.
//!
//! Every mutator returns the events it implies instead of publishing them,
//! so the caller can release the state lock before fan-out.

use crate::git::config_store::ConfigStore;
use crate::git::paths::RepositoryPaths;
use crate::git::refs::{self, LocalBranches, RemoteBranches};
use crate::git::types::{ConfigBranch, ConfigRemote, RepositoryLock, RepositoryStatus};

use super::events::RepositoryEvent;

#[derive(Debug, Default)]
pub(crate) struct RepositoryState {
    pub(crate) head: Option<String>,
    pub(crate) current_branch: Option<ConfigBranch>,
    pub(crate) current_remote: Option<ConfigRemote>,
    pub(crate) local_branches: LocalBranches,
    pub(crate) remote_branches: RemoteBranches,
    pub(crate) remotes: Vec<ConfigRemote>,
    pub(crate) locks: Vec<RepositoryLock>,
    pub(crate) last_status: Option<RepositoryStatus>,
}

impl RepositoryState {
    /// Recompute the active branch and remote from HEAD and config.
    ///
    /// Emits only for values that differ from the previous ones.
    pub(crate) fn rederive(
        &mut self,
        config: &dyn ConfigStore,
        default_remote: &str,
    ) -> Vec<RepositoryEvent> {
        let branch = refs::active_branch(self.head.as_deref(), config);
        let remote = refs::active_remote(branch.as_ref(), config, default_remote);

        let mut events = Vec::new();
        if branch != self.current_branch {
            self.current_branch.clone_from(&branch);
            events.push(RepositoryEvent::ActiveBranchChanged(branch));
        }
        if remote != self.current_remote {
            self.current_remote.clone_from(&remote);
            events.push(RepositoryEvent::ActiveRemoteChanged(remote));
        }
        events
    }

    /// Store new HEAD contents and re-derive.
    pub(crate) fn set_head(
        &mut self,
        head: Option<String>,
        config: &dyn ConfigStore,
        default_remote: &str,
    ) -> Vec<RepositoryEvent> {
        self.head = head;
        let mut events = self.rederive(config, default_remote);
        events.push(RepositoryEvent::HeadChanged(self.head.clone()));
        events
    }

    /// Drop the cached config parse and rebuild both branch maps from disk.
    pub(crate) fn reload(
        &mut self,
        paths: &RepositoryPaths,
        config: &dyn ConfigStore,
        default_remote: &str,
    ) -> Vec<RepositoryEvent> {
        config.reset();
        self.remotes = config.remotes();

        let mut events = Vec::new();
        let local = refs::load_local_branches(paths, config);
        if local != self.local_branches {
            self.local_branches = local;
            events.push(RepositoryEvent::LocalBranchListChanged);
        }
        let remote = refs::load_remote_branches(paths, config);
        if remote != self.remote_branches {
            self.remote_branches = remote;
            events.push(RepositoryEvent::RemoteBranchListChanged);
        }

        events.extend(self.rederive(config, default_remote));
        events.push(RepositoryEvent::RemoteOrTrackingChanged);
        events
    }

    /// Take over the repository model derived by a completed load, keeping
    /// locks and the last status.
    pub(crate) fn adopt(&mut self, loaded: Self) {
        self.head = loaded.head;
        self.current_branch = loaded.current_branch;
        self.current_remote = loaded.current_remote;
        self.local_branches = loaded.local_branches;
        self.remote_branches = loaded.remote_branches;
        self.remotes = loaded.remotes;
    }

    /// Add a local branch unless already present. Returns whether the map changed.
    pub(crate) fn add_local_branch(&mut self, name: &str, config: &dyn ConfigStore) -> bool {
        if self.local_branches.contains_key(name) {
            return false;
        }
        let branch = config
            .branch(name)
            .unwrap_or_else(|| ConfigBranch::untracked(name));
        self.local_branches.insert(name.to_string(), branch);
        true
    }

    pub(crate) fn remove_local_branch(&mut self, name: &str) -> bool {
        self.local_branches.remove(name).is_some()
    }

    /// Add a remote-tracking branch of a known remote. Returns whether the
    /// map changed.
    pub(crate) fn add_remote_branch(&mut self, remote: &str, name: &str) -> bool {
        let Some(owner) = self.remotes.iter().find(|r| r.name == remote).cloned() else {
            return false;
        };
        let branches = self.remote_branches.entry(remote.to_string()).or_default();
        if branches.contains_key(name) {
            return false;
        }
        branches.insert(name.to_string(), ConfigBranch::tracking(name, owner));
        true
    }

    /// Remove a branch from its owning remote's map.
    pub(crate) fn remove_remote_branch(&mut self, remote: &str, name: &str) -> bool {
        self.remote_branches
            .get_mut(remote)
            .is_some_and(|branches| branches.remove(name).is_some())
    }

    pub(crate) fn is_current_branch(&self, name: &str) -> bool {
        self.current_branch.as_ref().is_some_and(|b| b.name == name)
    }
}
