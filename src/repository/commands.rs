// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mutating commands, each wrapped in the busy gate.
//!
//! ```text
//! fetch(remote)
//!   -> run_command(Operation::Fetch, |gateway| gateway.fetch(remote))
//!        BusyGuard::acquire      sync: Busy / NotInitialized / Disposed
//!        spawn {
//!            command.await
//!            drop(guard)         resume watcher, clear busy
//!            after_command()     resync / config reload
//!        }
//!
//! lock_file(path) / unlock_file(path)
//!   -> run_lock_edit: same gate, then
//!        spawn {
//!            edit.await; list_locks.await   lock view refreshed either way
//!            drop(guard)
//!        }
//!   <- CommandHandle<String>
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::error::StateResult;
use crate::git::gateway::{CommandGateway, CommandHandle, Operation};
use crate::git::types::RepositoryLock;

use super::{RepositoryManager, Shared};
use super::events::RepositoryEvent;
use super::guard::BusyGuard;

impl RepositoryManager {
    /// Issue `command` under the busy gate.
    ///
    /// `command` is only invoked once the gate is held and, for ref-mutating
    /// operations, the watcher is paused.
    fn run_command<T, F>(&self, operation: Operation, command: F) -> StateResult<CommandHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CommandGateway) -> BoxFuture<'static, StateResult<T>>,
    {
        let guard = BusyGuard::acquire(&self.shared, operation)?;
        debug!(operation = %operation, "command started");
        let pending = command(self.shared.gateway.as_ref());

        let manager = self.clone();
        let task = tokio::spawn(async move {
            let result = pending.await;
            drop(guard);

            match &result {
                Ok(_) => debug!(operation = %operation, "command finished"),
                Err(e) => warn!(operation = %operation, error = %e, "command failed"),
            }
            manager.after_command(operation, result.is_ok());
            result
        });

        Ok(CommandHandle::new(operation, task))
    }

    /// Follow-up work once the gate has been released.
    fn after_command(&self, operation: Operation, succeeded: bool) {
        // The paused watcher missed whatever the command rewrote
        if operation.is_ref_mutating() && succeeded {
            self.resync();
        }

        // Elsewhere the config watcher reports remote edits on its own
        if operation.is_remote_edit() && succeeded && !cfg!(windows) {
            self.reload_config();
        }
    }

    /// Run a lock edit, then refresh the lock view inside the same gate
    /// whatever the edit's outcome.
    fn run_lock_edit(
        &self,
        operation: Operation,
        edit: impl FnOnce(&dyn CommandGateway) -> BoxFuture<'static, StateResult<String>>,
    ) -> StateResult<CommandHandle<String>> {
        debug_assert!(operation.is_lock_edit());
        let shared = Arc::clone(&self.shared);
        self.run_command(operation, |gateway| {
            let edit = edit(gateway);
            let listing = gateway.list_locks(false);
            async move {
                let result = edit.await;
                if let Err(e) = store_locks(&shared, listing.await) {
                    debug!(error = %e, "lock list refresh failed");
                }
                result
            }
            .boxed()
        })
    }

    /// Stage `paths` and commit them.
    ///
    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn commit_files(
        &self,
        paths: &[PathBuf],
        message: &str,
        body: Option<&str>,
    ) -> StateResult<CommandHandle<String>> {
        self.run_command(Operation::Commit, |gateway| {
            let add = gateway.add(paths);
            let commit = gateway.commit(message, body);
            async move {
                add.await?;
                commit.await
            }
            .boxed()
        })
    }

    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn fetch(&self, remote: &str) -> StateResult<CommandHandle<String>> {
        self.run_command(Operation::Fetch, |gateway| gateway.fetch(remote))
    }

    /// Pull `branch` from `remote`. The watcher is paused meanwhile.
    ///
    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn pull(&self, remote: &str, branch: &str) -> StateResult<CommandHandle<String>> {
        self.run_command(Operation::Pull, |gateway| gateway.pull(remote, branch))
    }

    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn push(&self, remote: &str, branch: &str) -> StateResult<CommandHandle<String>> {
        self.run_command(Operation::Push, |gateway| gateway.push(remote, branch))
    }

    /// Add a remote. On success the config is reloaded.
    ///
    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn remote_add(&self, remote: &str, url: &str) -> StateResult<CommandHandle<String>> {
        self.run_command(Operation::RemoteAdd, |gateway| gateway.remote_add(remote, url))
    }

    /// Remove a remote. On success the config is reloaded.
    ///
    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn remote_remove(&self, remote: &str) -> StateResult<CommandHandle<String>> {
        self.run_command(Operation::RemoteRemove, |gateway| gateway.remote_remove(remote))
    }

    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn remote_change(&self, remote: &str, url: &str) -> StateResult<CommandHandle<String>> {
        self.run_command(Operation::RemoteChange, |gateway| {
            gateway.remote_change(remote, url)
        })
    }

    /// Check out `branch`. The watcher is paused meanwhile.
    ///
    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn switch_branch(&self, branch: &str) -> StateResult<CommandHandle<String>> {
        self.run_command(Operation::SwitchBranch, |gateway| gateway.switch_branch(branch))
    }

    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn create_branch(&self, branch: &str, base: &str) -> StateResult<CommandHandle<String>> {
        self.run_command(Operation::CreateBranch, |gateway| {
            gateway.create_branch(branch, base)
        })
    }

    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn delete_branch(
        &self,
        branch: &str,
        delete_unmerged: bool,
    ) -> StateResult<CommandHandle<String>> {
        self.run_command(Operation::DeleteBranch, |gateway| {
            gateway.delete_branch(branch, delete_unmerged)
        })
    }

    /// Refresh the lock view. On success the locks are stored and
    /// published.
    ///
    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn list_locks(&self, local: bool) -> StateResult<CommandHandle<Vec<RepositoryLock>>> {
        let shared = Arc::clone(&self.shared);
        self.run_command(Operation::ListLocks, |gateway| {
            let listing = gateway.list_locks(local);
            async move { store_locks(&shared, listing.await) }.boxed()
        })
    }

    /// Lock a file. The lock view is refreshed afterwards either way.
    ///
    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn lock_file(&self, path: &Path) -> StateResult<CommandHandle<String>> {
        self.run_lock_edit(Operation::LockFile, |gateway| gateway.lock_file(path))
    }

    /// Unlock a file, `force` releasing another user's lock. The lock view
    /// is refreshed afterwards either way.
    ///
    /// # Errors
    ///
    /// Fails immediately if another command is in flight or the manager is
    /// not initialized.
    pub fn unlock_file(&self, path: &Path, force: bool) -> StateResult<CommandHandle<String>> {
        self.run_lock_edit(Operation::UnlockFile, |gateway| {
            gateway.unlock_file(path, force)
        })
    }
}

/// Store and publish a successful lock listing.
fn store_locks(
    shared: &Shared,
    listing: StateResult<Vec<RepositoryLock>>,
) -> StateResult<Vec<RepositoryLock>> {
    let locks = listing?;
    shared.lock_state().locks.clone_from(&locks);
    shared
        .events
        .publish(RepositoryEvent::LocksUpdated(locks.clone()));
    Ok(locks)
}
