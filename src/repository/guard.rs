// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Busy gate with scoped watcher pause.
//!
//! ```text
//! acquire(op)
//!   busy: false -> true          (else GitError::Busy, nothing issued)
//!   publish BusyChanged(true)
//!   op is ref-mutating and watcher running?  -> watcher.stop()
//!        ...command runs...
//! drop
//!   watcher paused and manager still running? -> watcher.start()
//!   busy: true -> false
//!   publish BusyChanged(false)
//! ```
//!
//! The guard lives inside the task driving the command, so cleanup runs on
//! success, failure and task teardown alike.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::{debug, warn};

use crate::error::{GitError, StateResult};
use crate::git::gateway::Operation;

use super::events::RepositoryEvent;
use super::{Lifecycle, Shared};

pub(crate) struct BusyGuard {
    shared: Arc<Shared>,
    operation: Operation,
    paused_watcher: bool,
}

impl BusyGuard {
    pub(crate) fn acquire(shared: &Arc<Shared>, operation: Operation) -> StateResult<Self> {
        shared.lifecycle().ensure_active()?;

        if shared
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(operation = %operation, "rejected: repository busy");
            return Err(GitError::Busy {
                operation: operation.to_string(),
            }
            .into());
        }
        shared.events.publish(RepositoryEvent::BusyChanged(true));

        let paused_watcher = operation.is_ref_mutating() && shared.watcher.is_running();
        if paused_watcher {
            shared.watcher_paused.store(true, Ordering::Release);
            shared.watcher.stop();
            debug!(operation = %operation, "watcher paused");
        }

        Ok(Self {
            shared: Arc::clone(shared),
            operation,
            paused_watcher,
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let shared = &self.shared;

        if self.paused_watcher && shared.watcher_paused.swap(false, Ordering::AcqRel) {
            if shared.lifecycle() == Lifecycle::Running {
                match shared.watcher.start() {
                    Ok(()) => debug!(operation = %self.operation, "watcher resumed"),
                    Err(e) => warn!(operation = %self.operation, error = %e, "failed to resume watcher"),
                }
            } else {
                debug!(operation = %self.operation, "watcher left stopped");
            }
        }

        shared.busy.store(false, Ordering::Release);
        shared.events.publish(RepositoryEvent::BusyChanged(false));
    }
}
