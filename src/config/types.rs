// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Settings sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// `[git]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitSettings {
    /// Path to the git executable. Resolved through `PATH` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
}

/// `[status]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusSettings {
    /// Debounce window for status refreshes; 0 runs one refresh per trigger.
    pub debounce_ms: u64,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self { debounce_ms: 250 }
    }
}

impl StatusSettings {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// `[repository]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositorySettings {
    /// Host whose remote identifies the repository (clone URL, owner).
    pub canonical_host: String,
    /// Remote used as active remote when the checkout is not tracking.
    pub default_remote: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            canonical_host: "github.com".to_string(),
            default_remote: "origin".to_string(),
        }
    }
}

/// `[events]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventSettings {
    /// Buffered events per subscriber before it starts lagging.
    pub capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// `[watcher]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatcherSettings {
    pub enabled: bool,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}
