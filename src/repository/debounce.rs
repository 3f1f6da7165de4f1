// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Trailing-edge debounce on tokio timers.
//!
//! ```text
//! trigger  t0        t1     t2
//!          |---------x
//!                    |------x
//!                           |---------> action   (window after t2)
//! ```
//!
//! Each trigger takes a new ticket, aborts the pending timer and schedules
//! another. A timer that wakes up with a stale ticket does nothing. With a
//! zero window every trigger runs the action immediately.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Slot {
    ticket: u64,
    pending: Option<JoinHandle<()>>,
    disposed: bool,
}

#[derive(Debug)]
pub(crate) struct Debouncer {
    window: Duration,
    slot: Arc<Mutex<Slot>>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Debouncer {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Schedule `action`, superseding any run that has not fired yet.
    ///
    /// Outside a tokio runtime the trigger is dropped.
    pub(crate) fn trigger<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            debug!("no runtime, debounced action dropped");
            return;
        };

        let mut slot = lock(&self.slot);
        if slot.disposed {
            return;
        }

        if self.window.is_zero() {
            drop(slot);
            runtime.spawn(action());
            return;
        }

        slot.ticket = slot.ticket.wrapping_add(1);
        let ticket = slot.ticket;
        if let Some(previous) = slot.pending.take() {
            previous.abort();
        }

        let window = self.window;
        let shared = Arc::clone(&self.slot);
        slot.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(window).await;
            {
                let mut slot = lock(&shared);
                if slot.ticket != ticket || slot.disposed {
                    return;
                }
                slot.pending = None;
            }
            trace!(ticket, "debounce fired");
            action().await;
        }));
    }

    /// Drop any pending run and ignore later triggers.
    pub(crate) fn dispose(&self) {
        let mut slot = lock(&self.slot);
        slot.disposed = true;
        if let Some(pending) = slot.pending.take() {
            pending.abort();
        }
    }
}
