// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command gateway: the asynchronous version-control command layer.
//!
//! ```text
//!  RepositoryManager
//!        |  Operation + BoxFuture
//!        v
//!  CommandGateway (trait)            CommandHandle<T>
//!   add / commit / fetch / ...  -->  JoinHandle wrapper, awaited by
//!        |                           the caller for the completion
//!        v
//!  ShellGateway --> git <args> (tokio::process, stdin closed)
//!        |
//!        +--> parse::status_porcelain   (status)
//!        +--> parse::lfs_locks          (lfs locks --json)
//! ```
//!
//! Every method returns a `'static` boxed future so the manager can move it
//! into a spawned task that owns the busy guard.

pub mod parse;
mod shell;

pub use shell::ShellGateway;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;

use crate::error::{GitError, StateResult};

use super::types::{RepositoryLock, RepositoryStatus};

/// Mutating command kinds routed through the busy gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Commit,
    Fetch,
    Pull,
    Push,
    RemoteAdd,
    RemoteRemove,
    RemoteChange,
    SwitchBranch,
    CreateBranch,
    DeleteBranch,
    LockFile,
    UnlockFile,
    ListLocks,
}

impl Operation {
    /// Commands that rewrite refs under the watcher's feet.
    ///
    /// The watcher is paused for the duration of these.
    #[must_use]
    pub const fn is_ref_mutating(self) -> bool {
        matches!(self, Self::Pull | Self::SwitchBranch)
    }

    /// Commands that edit the config file.
    #[must_use]
    pub const fn is_remote_edit(self) -> bool {
        matches!(self, Self::RemoteAdd | Self::RemoteRemove)
    }

    /// Commands followed by a lock-list refresh.
    #[must_use]
    pub const fn is_lock_edit(self) -> bool {
        matches!(self, Self::LockFile | Self::UnlockFile)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Fetch => "fetch",
            Self::Pull => "pull",
            Self::Push => "push",
            Self::RemoteAdd => "remote add",
            Self::RemoteRemove => "remote remove",
            Self::RemoteChange => "remote change",
            Self::SwitchBranch => "switch branch",
            Self::CreateBranch => "create branch",
            Self::DeleteBranch => "delete branch",
            Self::LockFile => "lock file",
            Self::UnlockFile => "unlock file",
            Self::ListLocks => "list locks",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asynchronous version-control commands.
///
/// Mutating commands resolve to the command's standard output. A command
/// that runs but reports failure resolves to [`GitError::CommandFailed`].
pub trait CommandGateway: Send + Sync {
    fn add(&self, paths: &[PathBuf]) -> BoxFuture<'static, StateResult<String>>;

    /// Commit the index. `body` becomes a second message paragraph.
    fn commit(&self, message: &str, body: Option<&str>) -> BoxFuture<'static, StateResult<String>>;

    fn fetch(&self, remote: &str) -> BoxFuture<'static, StateResult<String>>;

    fn pull(&self, remote: &str, branch: &str) -> BoxFuture<'static, StateResult<String>>;

    fn push(&self, remote: &str, branch: &str) -> BoxFuture<'static, StateResult<String>>;

    fn remote_add(&self, name: &str, url: &str) -> BoxFuture<'static, StateResult<String>>;

    fn remote_remove(&self, name: &str) -> BoxFuture<'static, StateResult<String>>;

    /// Point an existing remote at a new URL.
    fn remote_change(&self, name: &str, url: &str) -> BoxFuture<'static, StateResult<String>>;

    fn switch_branch(&self, branch: &str) -> BoxFuture<'static, StateResult<String>>;

    fn create_branch(&self, branch: &str, base: &str) -> BoxFuture<'static, StateResult<String>>;

    /// Delete a local branch; `force` also deletes unmerged work.
    fn delete_branch(&self, branch: &str, force: bool) -> BoxFuture<'static, StateResult<String>>;

    fn lock_file(&self, path: &Path) -> BoxFuture<'static, StateResult<String>>;

    fn unlock_file(
        &self,
        path: &Path,
        force: bool,
    ) -> BoxFuture<'static, StateResult<String>>;

    /// Locks on the server, or only those held by this clone when `local`.
    fn list_locks(&self, local: bool) -> BoxFuture<'static, StateResult<Vec<RepositoryLock>>>;

    fn status(&self) -> BoxFuture<'static, StateResult<RepositoryStatus>>;

    /// Value of a config key, `None` when unset.
    fn get_config(&self, key: &str) -> BoxFuture<'static, StateResult<Option<String>>>;
}

/// Deferred result of a wrapped command.
///
/// Await it for the completion. Dropping it does not cancel the command;
/// the busy gate is released when the command itself finishes.
#[derive(Debug)]
pub struct CommandHandle<T> {
    operation: Operation,
    task: JoinHandle<StateResult<T>>,
}

impl<T> CommandHandle<T> {
    pub(crate) const fn new(operation: Operation, task: JoinHandle<StateResult<T>>) -> Self {
        Self { operation, task }
    }

    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Whether the command and its cleanup have completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Future for CommandHandle<T> {
    type Output = StateResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let operation = self.operation;
        Pin::new(&mut self.task).poll(cx).map(|joined| {
            joined.unwrap_or_else(|_| {
                Err(GitError::Canceled {
                    operation: operation.to_string(),
                }
                .into())
            })
        })
    }
}
