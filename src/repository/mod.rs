// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository state manager.
//!
//! ```text
//!   ChangeWatcher --flume--> pump task --> handle_watch_event
//!                                               |
//!                                    Mutex<RepositoryState>
//!                                               |
//!   caller --> fetch/pull/...                   v
//!       BusyGuard --> CommandGateway      EventBus (broadcast)
//!       (spawned task owns the guard)           |
//!       CommandHandle<T> <-- completion         v
//!                                           subscribers
//!
//!   RepositoryChanged / HEAD / refresh() --> Debouncer --> status
//! ```
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized -> Initializing -> Ready -> Running <-> Stopped
//!        ^______________|  (failure)            \        /
//!                                                 Disposed
//! ```

mod commands;
mod debounce;
pub mod events;
mod guard;
mod state;

#[cfg(test)]
mod test_support;

pub use events::{EventBus, RepositoryEvent};

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use bon::Builder;
use tokio::sync::{OnceCell, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::config::Settings;
use crate::error::{ConfigError, GitError, StateResult};
use crate::git::config_store::{ConfigStore, GixConfigStore};
use crate::git::gateway::{CommandGateway, ShellGateway};
use crate::git::paths::RepositoryPaths;
use crate::git::refs::{self, LocalBranches, RemoteBranches};
use crate::git::types::{
    ConfigBranch, ConfigRemote, GitUser, RepositoryInfo, RepositoryLock, RepositoryStatus,
};
use crate::git::url::find_canonical_remote;
use crate::git::watcher::{ChangeWatcher, NotifyWatcher, WatchEvent};

use debounce::Debouncer;
use state::RepositoryState;

/// Manager lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Uninitialized,
    Initializing,
    /// Loaded; watcher not running.
    Ready,
    Running,
    /// Watcher stopped; state retained.
    Stopped,
    Disposed,
}

impl Lifecycle {
    /// Whether the repository is loaded and not disposed.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Ready | Self::Running | Self::Stopped)
    }

    fn ensure_active(self) -> StateResult<()> {
        match self {
            Self::Ready | Self::Running | Self::Stopped => Ok(()),
            Self::Disposed => Err(GitError::Disposed.into()),
            Self::Uninitialized | Self::Initializing => Err(GitError::NotInitialized.into()),
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Disposed => "disposed",
        })
    }
}

/// Tunables for a [`RepositoryManager`].
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ManagerOptions {
    /// Status refresh debounce window; zero runs every trigger.
    #[builder(setters(name = with_debounce), default = Duration::from_millis(250))]
    debounce: Duration,
    /// Host whose remote identifies the repository.
    #[builder(setters(name = with_canonical_host), into, default = "github.com".to_string())]
    canonical_host: String,
    /// Remote used when the active branch tracks nothing.
    #[builder(setters(name = with_default_remote), into, default = "origin".to_string())]
    default_remote: String,
    #[builder(setters(name = with_event_capacity), default = 64)]
    event_capacity: usize,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ManagerOptions {
    #[must_use]
    pub fn canonical_host(&self) -> &str {
        &self.canonical_host
    }

    #[must_use]
    pub fn default_remote(&self) -> &str {
        &self.default_remote
    }
}

impl From<&Settings> for ManagerOptions {
    fn from(settings: &Settings) -> Self {
        Self::builder()
            .with_debounce(settings.status.debounce())
            .with_canonical_host(settings.repository.canonical_host.clone())
            .with_default_remote(settings.repository.default_remote.clone())
            .with_event_capacity(settings.events.capacity)
            .build()
    }
}

pub(crate) struct Shared {
    paths: RepositoryPaths,
    options: ManagerOptions,
    gateway: Arc<dyn CommandGateway>,
    watcher: Arc<dyn ChangeWatcher>,
    config: Arc<dyn ConfigStore>,
    state: Mutex<RepositoryState>,
    busy: AtomicBool,
    watcher_paused: AtomicBool,
    lifecycle: Mutex<Lifecycle>,
    repository: OnceCell<RepositoryInfo>,
    events: EventBus,
    debouncer: Debouncer,
    shutdown: CancellationToken,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, RepositoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_lifecycle(&self, next: Lifecycle) -> Lifecycle {
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *lifecycle, next);
        if previous != next {
            debug!(from = %previous, to = %next, "lifecycle");
        }
        previous
    }

    fn publish_all(&self, events: Vec<RepositoryEvent>) {
        for event in events {
            self.events.publish(event);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.debouncer.dispose();
    }
}

/// Keeps the in-memory model of one repository in sync with disk and
/// serializes mutating commands against it.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct RepositoryManager {
    shared: Arc<Shared>,
}

impl fmt::Debug for RepositoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryManager")
            .field("work_tree", &self.shared.paths.work_tree())
            .field("lifecycle", &self.shared.lifecycle())
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl RepositoryManager {
    /// Assemble a manager from its collaborators. Nothing is read until
    /// [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(
        paths: RepositoryPaths,
        gateway: Arc<dyn CommandGateway>,
        watcher: Arc<dyn ChangeWatcher>,
        config: Arc<dyn ConfigStore>,
        options: ManagerOptions,
    ) -> Self {
        let events = EventBus::new(options.event_capacity);
        let debouncer = Debouncer::new(options.debounce);
        Self {
            shared: Arc::new(Shared {
                paths,
                options,
                gateway,
                watcher,
                config,
                state: Mutex::new(RepositoryState::default()),
                busy: AtomicBool::new(false),
                watcher_paused: AtomicBool::new(false),
                lifecycle: Mutex::new(Lifecycle::Uninitialized),
                repository: OnceCell::new(),
                events,
                debouncer,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Manager over the working tree at `root` using the git CLI, the
    /// repository config file and the OS file watcher.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::RepoNotFound`] if `root` has no metadata
    /// directory, or a process error if no git executable is available.
    pub fn open(root: impl Into<PathBuf>, settings: &Settings) -> StateResult<Self> {
        let paths = RepositoryPaths::new(root);
        if !paths.exists() {
            return Err(GitError::RepoNotFound {
                path: paths.work_tree().display().to_string(),
            }
            .into());
        }

        let gateway = ShellGateway::new(paths.work_tree(), settings.git.executable.as_deref())?;
        let watcher = NotifyWatcher::new(paths.clone());
        let config = GixConfigStore::new(paths.config_file());

        Ok(Self::new(
            paths,
            Arc::new(gateway),
            Arc::new(watcher),
            Arc::new(config),
            ManagerOptions::from(settings),
        ))
    }

    fn from_weak(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    // --- Lifecycle ---

    /// Load HEAD, config, branches and identity, then attach the watcher.
    ///
    /// Runs once; later calls return the cached repository. A failed run
    /// leaves the manager uninitialized and may be retried.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] if `user.email` is not
    /// configured, or any gateway or watcher failure.
    pub async fn initialize(&self) -> StateResult<RepositoryInfo> {
        if self.shared.lifecycle() == Lifecycle::Disposed {
            return Err(GitError::Disposed.into());
        }

        self.shared
            .repository
            .get_or_try_init(|| async {
                self.shared.set_lifecycle(Lifecycle::Initializing);
                match self.load().await {
                    Ok(info) => {
                        self.shared.set_lifecycle(Lifecycle::Ready);
                        info!(
                            repository = %info.name,
                            path = %info.local_path.display(),
                            "repository ready"
                        );
                        Ok(info)
                    }
                    Err(e) => {
                        self.shared.set_lifecycle(Lifecycle::Uninitialized);
                        Err(e)
                    }
                }
            })
            .await
            .cloned()
    }

    async fn load(&self) -> StateResult<RepositoryInfo> {
        let shared = &self.shared;
        let default_remote = shared.options.default_remote();

        // Derived aside; nothing is stored or published until the load succeeds
        let mut loaded = RepositoryState::default();
        let mut events = loaded.set_head(
            refs::read_head(&shared.paths),
            shared.config.as_ref(),
            default_remote,
        );
        events.extend(loaded.reload(&shared.paths, shared.config.as_ref(), default_remote));

        let email = shared
            .gateway
            .get_config("user.email")
            .await?
            .ok_or_else(|| ConfigError::MissingKey {
                section: "user".to_string(),
                key: "email".to_string(),
            })?;
        let name = shared
            .gateway
            .get_config("user.name")
            .await?
            .unwrap_or_else(|| email.clone());

        let canonical = find_canonical_remote(&loaded.remotes, shared.options.canonical_host());
        let dir_name = shared
            .paths
            .work_tree()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let info = RepositoryInfo {
            local_path: shared.paths.work_tree().to_path_buf(),
            name: canonical
                .as_ref()
                .map_or(dir_name, |(_, url)| url.name.clone()),
            owner: canonical.as_ref().and_then(|(_, url)| url.owner.clone()),
            clone_url: canonical.as_ref().map(|(remote, _)| remote.url.clone()),
            user: GitUser { name, email },
        };

        let (sink, watch_events) = flume::unbounded();
        shared.watcher.initialize(sink)?;

        shared.lock_state().adopt(loaded);
        shared.publish_all(events);
        self.spawn_event_pump(watch_events);

        Ok(info)
    }

    fn spawn_event_pump(&self, events: flume::Receiver<WatchEvent>) {
        let weak = Arc::downgrade(&self.shared);
        let shutdown = self.shared.shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    received = events.recv_async() => {
                        let Ok(event) = received else { break };
                        let Some(manager) = Self::from_weak(&weak) else { break };
                        manager.handle_watch_event(event);
                    }
                }
            }
            trace!("watch event pump finished");
        });
    }

    /// Start the watcher.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotInitialized`] before `initialize`, or the
    /// watcher's start error.
    pub fn start(&self) -> StateResult<()> {
        let shared = &self.shared;
        let current = shared.lifecycle();
        if current == Lifecycle::Running {
            return Ok(());
        }
        current.ensure_active()?;

        let previous = shared.set_lifecycle(Lifecycle::Running);
        // A paused watcher is resumed by the command holding it
        if !shared.watcher_paused.load(Ordering::Acquire)
            && let Err(e) = shared.watcher.start()
        {
            shared.set_lifecycle(previous);
            return Err(e);
        }
        info!(path = %shared.paths.work_tree().display(), "watching repository");
        Ok(())
    }

    /// Stop the watcher, keeping state. Stopping twice is a no-op.
    pub fn stop(&self) {
        let shared = &self.shared;
        if shared.lifecycle() != Lifecycle::Running {
            return;
        }
        shared.set_lifecycle(Lifecycle::Stopped);
        shared.watcher.stop();
        info!(path = %shared.paths.work_tree().display(), "stopped watching repository");
    }

    /// Stop and release the watcher and cancel pending refreshes.
    /// Disposing twice is a no-op.
    pub fn dispose(&self) {
        let shared = &self.shared;
        if shared.set_lifecycle(Lifecycle::Disposed) == Lifecycle::Disposed {
            return;
        }
        shared.shutdown.cancel();
        shared.debouncer.dispose();
        shared.watcher.stop();
        shared.watcher.dispose();
        info!(path = %shared.paths.work_tree().display(), "repository disposed");
    }

    /// Schedule one debounced status refresh.
    pub fn refresh(&self) {
        if self.shared.lifecycle().is_active() {
            self.schedule_status_refresh();
        }
    }

    // --- Watcher events ---

    /// Apply one watcher event to the model and publish what changed.
    ///
    /// Ignored unless the manager is initialized and not disposed.
    pub fn handle_watch_event(&self, event: WatchEvent) {
        let shared = &self.shared;
        if !shared.lifecycle().is_active() {
            trace!(?event, "watch event ignored");
            return;
        }
        trace!(?event, "watch event");

        let config = shared.config.as_ref();
        let default_remote = shared.options.default_remote();
        let mut refresh = false;

        let events = {
            let mut state = shared.lock_state();
            match event {
                WatchEvent::HeadChanged { contents } => {
                    refresh = true;
                    state.set_head(Some(contents), config, default_remote)
                }
                WatchEvent::IndexChanged => Vec::new(),
                WatchEvent::ConfigChanged => state.reload(&shared.paths, config, default_remote),
                WatchEvent::LocalBranchCreated(name) => state
                    .add_local_branch(&name, config)
                    .then_some(RepositoryEvent::LocalBranchListChanged)
                    .into_iter()
                    .collect(),
                WatchEvent::LocalBranchDeleted(name) => state
                    .remove_local_branch(&name)
                    .then_some(RepositoryEvent::LocalBranchListChanged)
                    .into_iter()
                    .collect(),
                WatchEvent::LocalBranchChanged(name) => {
                    if state.is_current_branch(&name) {
                        refresh = true;
                        vec![RepositoryEvent::ActiveBranchChanged(
                            state.current_branch.clone(),
                        )]
                    } else {
                        Vec::new()
                    }
                }
                WatchEvent::RemoteBranchCreated { remote, name } => state
                    .add_remote_branch(&remote, &name)
                    .then_some(RepositoryEvent::RemoteBranchListChanged)
                    .into_iter()
                    .collect(),
                WatchEvent::RemoteBranchDeleted { remote, name } => state
                    .remove_remote_branch(&remote, &name)
                    .then_some(RepositoryEvent::RemoteBranchListChanged)
                    .into_iter()
                    .collect(),
                WatchEvent::RepositoryChanged => {
                    refresh = true;
                    Vec::new()
                }
            }
        };

        shared.publish_all(events);
        if refresh {
            self.schedule_status_refresh();
        }
    }

    /// Re-read config and rebuild branch maps, as on a config change.
    fn reload_config(&self) {
        let shared = &self.shared;
        let events = shared.lock_state().reload(
            &shared.paths,
            shared.config.as_ref(),
            shared.options.default_remote(),
        );
        shared.publish_all(events);
    }

    /// Re-read HEAD and rebuild the branch maps after a ref-mutating
    /// command ran with the watcher paused.
    fn resync(&self) {
        let shared = &self.shared;
        if !shared.lifecycle().is_active() {
            return;
        }
        let config = shared.config.as_ref();
        let default_remote = shared.options.default_remote();
        let head = refs::read_head(&shared.paths);

        let events = {
            let mut state = shared.lock_state();
            let mut events = if head == state.head {
                Vec::new()
            } else {
                state.set_head(head, config, default_remote)
            };
            events.extend(state.reload(&shared.paths, config, default_remote));
            events
        };
        shared.publish_all(events);
        self.schedule_status_refresh();
    }

    // --- Status ---

    fn schedule_status_refresh(&self) {
        let weak = Arc::downgrade(&self.shared);
        self.shared.debouncer.trigger(move || async move {
            if let Some(manager) = Self::from_weak(&weak) {
                manager.refresh_status_now().await;
            }
        });
    }

    /// Best effort: failures are logged, never published.
    async fn refresh_status_now(&self) {
        match self.shared.gateway.status().await {
            Ok(status) => self.store_status(status),
            Err(e) => debug!(error = %e, "status refresh failed"),
        }
    }

    fn store_status(&self, status: RepositoryStatus) {
        self.shared.lock_state().last_status = Some(status.clone());
        self.shared
            .events
            .publish(RepositoryEvent::RepositoryChanged(status));
    }

    /// Run a status check now, bypassing the debounce window, and publish it.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; nothing is published on failure.
    pub async fn status(&self) -> StateResult<RepositoryStatus> {
        self.shared.lifecycle().ensure_active()?;
        let status = self.shared.gateway.status().await?;
        self.store_status(status.clone());
        Ok(status)
    }

    // --- Queries ---

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.lifecycle()
    }

    /// The loaded repository identity, once `initialize` succeeded.
    #[must_use]
    pub fn repository(&self) -> Option<RepositoryInfo> {
        self.shared.repository.get().cloned()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.shared.busy.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RepositoryEvent> {
        self.shared.events.subscribe()
    }

    #[must_use]
    pub fn head(&self) -> Option<String> {
        self.shared.lock_state().head.clone()
    }

    #[must_use]
    pub fn current_branch(&self) -> Option<ConfigBranch> {
        self.shared.lock_state().current_branch.clone()
    }

    #[must_use]
    pub fn current_remote(&self) -> Option<ConfigRemote> {
        self.shared.lock_state().current_remote.clone()
    }

    #[must_use]
    pub fn local_branches(&self) -> LocalBranches {
        self.shared.lock_state().local_branches.clone()
    }

    #[must_use]
    pub fn remote_branches(&self) -> RemoteBranches {
        self.shared.lock_state().remote_branches.clone()
    }

    #[must_use]
    pub fn remotes(&self) -> Vec<ConfigRemote> {
        self.shared.lock_state().remotes.clone()
    }

    /// Locks from the most recent lock-list refresh.
    #[must_use]
    pub fn locks(&self) -> Vec<RepositoryLock> {
        self.shared.lock_state().locks.clone()
    }

    #[must_use]
    pub fn last_status(&self) -> Option<RepositoryStatus> {
        self.shared.lock_state().last_status.clone()
    }
}
