// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory collaborators for manager tests.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tempfile::TempDir;
use tokio::sync::{Semaphore, broadcast};

use crate::error::{GitError, StateResult};
use crate::git::config_store::ConfigStore;
use crate::git::gateway::CommandGateway;
use crate::git::paths::RepositoryPaths;
use crate::git::types::{ConfigBranch, ConfigRemote, RepositoryLock, RepositoryStatus};
use crate::git::watcher::{ChangeWatcher, WatchEvent};

use super::{ManagerOptions, RepositoryEvent, RepositoryManager};

// --- Gateway ---

/// One issued command and whether the watcher was running at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Issued {
    pub(crate) command: String,
    pub(crate) watcher_running: bool,
}

struct GatewayInner {
    issued: Mutex<Vec<Issued>>,
    config: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    locks: Mutex<Vec<RepositoryLock>>,
    status_calls: AtomicUsize,
    held: AtomicBool,
    gate: Semaphore,
    watcher: Mutex<Option<Arc<MockWatcher>>>,
}

impl Default for GatewayInner {
    fn default() -> Self {
        Self {
            issued: Mutex::default(),
            config: Mutex::default(),
            failing: Mutex::default(),
            locks: Mutex::default(),
            status_calls: AtomicUsize::new(0),
            held: AtomicBool::new(false),
            gate: Semaphore::new(0),
            watcher: Mutex::default(),
        }
    }
}

/// Records commands when they actually run. Commands whose first word is
/// marked failing resolve to `CommandFailed`; while held, commands block
/// until released.
#[derive(Clone, Default)]
pub(crate) struct MockGateway {
    inner: Arc<GatewayInner>,
}

impl MockGateway {
    pub(crate) fn set_config(&self, key: &str, value: &str) {
        self.inner
            .config
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub(crate) fn unset_config(&self, key: &str) {
        self.inner.config.lock().unwrap().remove(key);
    }

    pub(crate) fn fail(&self, command: &str) {
        self.inner
            .failing
            .lock()
            .unwrap()
            .insert(command.to_string());
    }

    pub(crate) fn set_locks(&self, locks: Vec<RepositoryLock>) {
        *self.inner.locks.lock().unwrap() = locks;
    }

    pub(crate) fn observe(&self, watcher: Arc<MockWatcher>) {
        *self.inner.watcher.lock().unwrap() = Some(watcher);
    }

    pub(crate) fn hold(&self) {
        self.inner.held.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release(&self) {
        self.inner.held.store(false, Ordering::SeqCst);
        self.inner.gate.add_permits(1024);
    }

    pub(crate) fn issued(&self) -> Vec<Issued> {
        self.inner.issued.lock().unwrap().clone()
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.issued().into_iter().map(|i| i.command).collect()
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.inner.status_calls.load(Ordering::SeqCst)
    }

    fn respond<T, F>(&self, command: String, value: F) -> BoxFuture<'static, StateResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&GatewayInner) -> T + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        async move {
            let watcher_running = inner
                .watcher
                .lock()
                .unwrap()
                .as_ref()
                .is_some_and(|w| w.is_running());
            inner.issued.lock().unwrap().push(Issued {
                command: command.clone(),
                watcher_running,
            });

            if inner.held.load(Ordering::SeqCst) {
                let _permit = inner.gate.acquire().await;
            }

            let verb = command.split_whitespace().next().unwrap_or_default();
            if inner.failing.lock().unwrap().contains(verb) {
                return Err(GitError::CommandFailed {
                    command: format!("git {command}"),
                    message: "simulated failure".to_string(),
                }
                .into());
            }
            Ok(value(&inner))
        }
        .boxed()
    }

    fn output(&self, command: String) -> BoxFuture<'static, StateResult<String>> {
        self.respond(command, |_| String::new())
    }
}

impl CommandGateway for MockGateway {
    fn add(&self, paths: &[PathBuf]) -> BoxFuture<'static, StateResult<String>> {
        let list: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        self.output(format!("add {}", list.join(" ")))
    }

    fn commit(&self, message: &str, _body: Option<&str>) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("commit {message}"))
    }

    fn fetch(&self, remote: &str) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("fetch {remote}"))
    }

    fn pull(&self, remote: &str, branch: &str) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("pull {remote} {branch}"))
    }

    fn push(&self, remote: &str, branch: &str) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("push {remote} {branch}"))
    }

    fn remote_add(&self, name: &str, url: &str) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("remote-add {name} {url}"))
    }

    fn remote_remove(&self, name: &str) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("remote-remove {name}"))
    }

    fn remote_change(&self, name: &str, url: &str) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("remote-change {name} {url}"))
    }

    fn switch_branch(&self, branch: &str) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("switch {branch}"))
    }

    fn create_branch(&self, branch: &str, base: &str) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("branch {branch} {base}"))
    }

    fn delete_branch(&self, branch: &str, force: bool) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("delete-branch {branch} {force}"))
    }

    fn lock_file(&self, path: &Path) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("lock {}", path.display()))
    }

    fn unlock_file(&self, path: &Path, force: bool) -> BoxFuture<'static, StateResult<String>> {
        self.output(format!("unlock {} {force}", path.display()))
    }

    fn list_locks(&self, local: bool) -> BoxFuture<'static, StateResult<Vec<RepositoryLock>>> {
        self.respond(format!("locks {local}"), |inner| {
            inner.locks.lock().unwrap().clone()
        })
    }

    fn status(&self) -> BoxFuture<'static, StateResult<RepositoryStatus>> {
        self.inner.status_calls.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);
        async move {
            if inner.failing.lock().unwrap().contains("status") {
                return Err(GitError::CommandFailed {
                    command: "git status".to_string(),
                    message: "simulated failure".to_string(),
                }
                .into());
            }
            Ok(RepositoryStatus {
                local_branch: Some("main".to_string()),
                ..RepositoryStatus::default()
            })
        }
        .boxed()
    }

    fn get_config(&self, key: &str) -> BoxFuture<'static, StateResult<Option<String>>> {
        let key = key.to_string();
        self.respond(format!("config {key}"), move |inner| {
            inner.config.lock().unwrap().get(&key).cloned()
        })
    }
}

// --- Watcher ---

/// Counts effective start/stop transitions.
#[derive(Default)]
pub(crate) struct MockWatcher {
    running: AtomicBool,
    disposed: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    disposals: AtomicUsize,
    sink: Mutex<Option<flume::Sender<WatchEvent>>>,
}

impl MockWatcher {
    pub(crate) fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub(crate) fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub(crate) fn disposals(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    /// Raise an event through the sink handed over in `initialize`.
    pub(crate) fn emit(&self, event: WatchEvent) {
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.send(event).unwrap();
        }
    }
}

impl ChangeWatcher for MockWatcher {
    fn initialize(&self, sink: flume::Sender<WatchEvent>) -> StateResult<()> {
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn start(&self) -> StateResult<()> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(GitError::Disposed.into());
        }
        if !self.running.swap(true, Ordering::SeqCst) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
        self.disposed.store(true, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
    }
}

// --- Config ---

#[derive(Default)]
pub(crate) struct MemoryConfig {
    remotes: Mutex<Vec<ConfigRemote>>,
    tracking: Mutex<Vec<(String, String)>>,
    resets: AtomicUsize,
}

impl MemoryConfig {
    pub(crate) fn add_remote(&self, name: &str, url: &str) {
        self.remotes
            .lock()
            .unwrap()
            .push(ConfigRemote::new(name, url));
    }

    pub(crate) fn track(&self, branch: &str, remote: &str) {
        self.tracking
            .lock()
            .unwrap()
            .push((branch.to_string(), remote.to_string()));
    }

    pub(crate) fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl ConfigStore for MemoryConfig {
    fn branches(&self) -> Vec<ConfigBranch> {
        let remotes = self.remotes.lock().unwrap().clone();
        self.tracking
            .lock()
            .unwrap()
            .iter()
            .map(|(branch, remote)| ConfigBranch {
                name: branch.clone(),
                remote: remotes.iter().find(|r| &r.name == remote).cloned(),
            })
            .collect()
    }

    fn remotes(&self) -> Vec<ConfigRemote> {
        self.remotes.lock().unwrap().clone()
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

// --- Harness ---

pub(crate) const ORIGIN_URL: &str = "https://github.com/org/repo.git";

pub(crate) struct Harness {
    pub(crate) temp: TempDir,
    pub(crate) paths: RepositoryPaths,
    pub(crate) gateway: MockGateway,
    pub(crate) watcher: Arc<MockWatcher>,
    pub(crate) config: Arc<MemoryConfig>,
    pub(crate) manager: RepositoryManager,
}

impl Harness {
    /// A repository on `main` tracking `origin`, with `origin/main` fetched
    /// and `user.email` configured.
    pub(crate) fn new(debounce: Duration) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let paths = RepositoryPaths::new(temp.path());
        fs::create_dir_all(paths.branches_dir()).unwrap();
        fs::create_dir_all(paths.remotes_dir().join("origin")).unwrap();
        fs::write(paths.head_file(), "ref: refs/heads/main\n").unwrap();

        let harness_paths = paths.clone();
        let gateway = MockGateway::default();
        gateway.set_config("user.email", "dev@example.com");
        gateway.set_config("user.name", "Dev");
        let watcher = Arc::new(MockWatcher::default());
        gateway.observe(Arc::clone(&watcher));
        let config = Arc::new(MemoryConfig::default());
        config.add_remote("origin", ORIGIN_URL);
        config.track("main", "origin");

        let manager = RepositoryManager::new(
            paths,
            Arc::new(gateway.clone()),
            Arc::clone(&watcher) as Arc<dyn ChangeWatcher>,
            Arc::clone(&config) as Arc<dyn ConfigStore>,
            ManagerOptions::builder().with_debounce(debounce).build(),
        );

        let harness = Self {
            temp,
            paths: harness_paths,
            gateway,
            watcher,
            config,
            manager,
        };
        harness.write_local("main");
        harness.write_remote("origin", "main");
        harness
    }

    pub(crate) fn write_local(&self, name: &str) {
        write_ref(&self.paths.branches_dir().join(name));
    }

    pub(crate) fn delete_local(&self, name: &str) {
        fs::remove_file(self.paths.branches_dir().join(name)).unwrap();
    }

    pub(crate) fn write_remote(&self, remote: &str, name: &str) {
        write_ref(&self.paths.remotes_dir().join(remote).join(name));
    }

    pub(crate) fn root(&self) -> &Path {
        self.temp.path()
    }
}

fn write_ref(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "3b18e512dba79e4c8300dd08aeb37f8e728b8dad\n").unwrap();
}

/// Everything currently buffered on `events`.
pub(crate) fn drain(events: &mut broadcast::Receiver<RepositoryEvent>) -> Vec<RepositoryEvent> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}
