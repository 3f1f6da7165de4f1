// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! [`ChangeWatcher`] over the OS file watcher.

use std::sync::{Arc, Mutex, PoisonError};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, trace, warn};

use crate::error::{GitError, StateResult, WatcherError};
use crate::git::paths::RepositoryPaths;

use super::{ChangeWatcher, KnownRefs, PathKind, WatchEvent, classify};

#[derive(Default)]
struct State {
    sink: Option<flume::Sender<WatchEvent>>,
    watcher: Option<RecommendedWatcher>,
    disposed: bool,
}

/// Watches the working tree and metadata directory with `notify`.
///
/// The OS watcher exists only while running; `stop` drops it and `start`
/// creates a fresh one after rescanning the known refs.
pub struct NotifyWatcher {
    paths: RepositoryPaths,
    known: Arc<Mutex<KnownRefs>>,
    state: Mutex<State>,
}

impl std::fmt::Debug for NotifyWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyWatcher")
            .field("work_tree", &self.paths.work_tree())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl NotifyWatcher {
    #[must_use]
    pub fn new(paths: RepositoryPaths) -> Self {
        Self {
            paths,
            known: Arc::new(Mutex::new(KnownRefs::default())),
            state: Mutex::new(State::default()),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn create_watcher(
        &self,
        sink: flume::Sender<WatchEvent>,
    ) -> Result<RecommendedWatcher, WatcherError> {
        let paths = self.paths.clone();
        let known = Arc::clone(&self.known);

        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| match result {
                Ok(event) => forward(&paths, &known, &sink, event),
                Err(e) => warn!(error = %e, "watch error"),
            },
            notify::Config::default(),
        )
        .map_err(WatcherError::Create)?;

        let mut roots = vec![self.paths.work_tree()];
        if self.paths.is_linked_worktree() {
            roots.push(self.paths.git_dir());
        }
        for root in roots {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|source| WatcherError::WatchPath {
                    path: root.to_path_buf(),
                    source,
                })?;
        }

        Ok(watcher)
    }
}

/// Translate one OS event into zero or more watch events.
fn forward(
    paths: &RepositoryPaths,
    known: &Mutex<KnownRefs>,
    sink: &flume::Sender<WatchEvent>,
    event: Event,
) {
    if event.kind.is_access() || event.kind.is_other() {
        return;
    }

    let mut work_tree_changed = false;
    for path in &event.paths {
        let kind = classify(paths, path);
        trace!(path = %path.display(), ?kind, "fs event");

        let watch_event = match kind {
            PathKind::Ignored => None,
            PathKind::WorkTree => {
                // One notification per OS event is enough
                if work_tree_changed {
                    None
                } else {
                    work_tree_changed = true;
                    Some(WatchEvent::RepositoryChanged)
                }
            }
            PathKind::Head => std::fs::read_to_string(path)
                .ok()
                .map(|contents| WatchEvent::HeadChanged {
                    contents: contents.trim().to_string(),
                }),
            kind => known
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .event_for(kind, path.is_file()),
        };

        if let Some(watch_event) = watch_event
            && sink.send(watch_event).is_err()
        {
            debug!("watch event receiver dropped");
            return;
        }
    }
}

impl ChangeWatcher for NotifyWatcher {
    fn initialize(&self, sink: flume::Sender<WatchEvent>) -> StateResult<()> {
        let mut state = self.lock_state();
        if state.disposed {
            return Err(GitError::Disposed.into());
        }
        state.sink = Some(sink);
        Ok(())
    }

    fn start(&self) -> StateResult<()> {
        let mut state = self.lock_state();
        if state.disposed {
            return Err(GitError::Disposed.into());
        }
        if state.watcher.is_some() {
            return Ok(());
        }
        let sink = state.sink.clone().ok_or(WatcherError::NotInitialized)?;

        *self.known.lock().unwrap_or_else(PoisonError::into_inner) = KnownRefs::scan(&self.paths);
        state.watcher = Some(self.create_watcher(sink)?);

        info!(path = %self.paths.work_tree().display(), "watcher started");
        Ok(())
    }

    fn stop(&self) {
        if self.lock_state().watcher.take().is_some() {
            info!(path = %self.paths.work_tree().display(), "watcher stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.lock_state().watcher.is_some()
    }

    fn dispose(&self) {
        let mut state = self.lock_state();
        state.watcher = None;
        state.sink = None;
        state.disposed = true;
    }
}
