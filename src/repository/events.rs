// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Published repository events.
//!
//! Fan-out uses a `tokio::sync::broadcast` channel: every subscriber gets its
//! own cursor, subscribing or dropping a receiver mid-publish is safe, and a
//! slow subscriber only lags itself.

use std::fmt;

use tokio::sync::broadcast;
use tracing::trace;

use crate::git::types::{ConfigBranch, ConfigRemote, RepositoryLock, RepositoryStatus};

/// Notifications produced by the repository manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryEvent {
    /// The checked-out branch, or its tracking data, changed.
    ActiveBranchChanged(Option<ConfigBranch>),
    ActiveRemoteChanged(Option<ConfigRemote>),
    LocalBranchListChanged,
    RemoteBranchListChanged,
    /// A status refresh completed.
    RepositoryChanged(RepositoryStatus),
    /// HEAD contents after a rewrite.
    HeadChanged(Option<String>),
    BusyChanged(bool),
    /// Remotes or tracking configuration were reloaded.
    RemoteOrTrackingChanged,
    LocksUpdated(Vec<RepositoryLock>),
}

impl RepositoryEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ActiveBranchChanged(_) => "active-branch-changed",
            Self::ActiveRemoteChanged(_) => "active-remote-changed",
            Self::LocalBranchListChanged => "local-branch-list-changed",
            Self::RemoteBranchListChanged => "remote-branch-list-changed",
            Self::RepositoryChanged(_) => "repository-changed",
            Self::HeadChanged(_) => "head-changed",
            Self::BusyChanged(_) => "busy-changed",
            Self::RemoteOrTrackingChanged => "remote-or-tracking-changed",
            Self::LocksUpdated(_) => "locks-updated",
        }
    }
}

impl fmt::Display for RepositoryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Self::ActiveBranchChanged(Some(branch)) => write!(f, "{name}: {branch}"),
            Self::ActiveRemoteChanged(Some(remote)) => write!(f, "{name}: {remote}"),
            Self::ActiveBranchChanged(None) | Self::ActiveRemoteChanged(None) => {
                write!(f, "{name}: none")
            }
            Self::RepositoryChanged(status) => write!(
                f,
                "{name}: {} changed path(s), ahead {}, behind {}",
                status.entries.len(),
                status.ahead,
                status.behind
            ),
            Self::HeadChanged(head) => write!(f, "{name}: {}", head.as_deref().unwrap_or("none")),
            Self::BusyChanged(busy) => write!(f, "{name}: {busy}"),
            Self::LocksUpdated(locks) => write!(f, "{name}: {} lock(s)", locks.len()),
            Self::LocalBranchListChanged
            | Self::RemoteBranchListChanged
            | Self::RemoteOrTrackingChanged => f.write_str(name),
        }
    }
}

/// Multi-subscriber event publisher.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RepositoryEvent>,
}

impl EventBus {
    /// A bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RepositoryEvent> {
        self.sender.subscribe()
    }

    /// Deliver to every current subscriber. No subscribers is not an error.
    pub fn publish(&self, event: RepositoryEvent) {
        trace!(event = event.name(), "publish");
        let _ = self.sender.send(event);
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
