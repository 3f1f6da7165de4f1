// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository config access.
//!
//! ```text
//! ConfigStore (trait)
//!   branches / branch / remotes / remote / reset
//!        |
//!        v
//! GixConfigStore --> gix::config::File (<git_dir>/config, no includes)
//!   parsed lazily, cached until reset()
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{trace, warn};

use crate::error::ConfigError;

use super::types::{ConfigBranch, ConfigRemote};

/// Parsed view of the repository config file.
pub trait ConfigStore: Send + Sync {
    /// Branches with a `[branch "<name>"]` section, in file order.
    fn branches(&self) -> Vec<ConfigBranch>;

    fn branch(&self, name: &str) -> Option<ConfigBranch> {
        self.branches().into_iter().find(|b| b.name == name)
    }

    /// Remotes with a URL, in file order.
    fn remotes(&self) -> Vec<ConfigRemote>;

    fn remote(&self, name: &str) -> Option<ConfigRemote> {
        self.remotes().into_iter().find(|r| r.name == name)
    }

    /// Drop any cached parse; the next read goes back to disk.
    fn reset(&self);
}

#[derive(Debug, Clone, Default)]
struct ParsedConfig {
    remotes: Vec<ConfigRemote>,
    branches: Vec<ConfigBranch>,
}

/// [`ConfigStore`] backed by `gix::config`.
#[derive(Debug)]
pub struct GixConfigStore {
    path: PathBuf,
    cache: Mutex<Option<ParsedConfig>>,
}

impl GixConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_parsed<T>(&self, f: impl FnOnce(&ParsedConfig) -> T) -> T {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let parsed = cache.get_or_insert_with(|| {
            load_config(&self.path).unwrap_or_else(|e| {
                warn!(error = %e, "ignoring unreadable repository config");
                ParsedConfig::default()
            })
        });
        f(parsed)
    }
}

impl ConfigStore for GixConfigStore {
    fn branches(&self) -> Vec<ConfigBranch> {
        self.with_parsed(|c| c.branches.clone())
    }

    fn branch(&self, name: &str) -> Option<ConfigBranch> {
        self.with_parsed(|c| c.branches.iter().find(|b| b.name == name).cloned())
    }

    fn remotes(&self) -> Vec<ConfigRemote> {
        self.with_parsed(|c| c.remotes.clone())
    }

    fn remote(&self, name: &str) -> Option<ConfigRemote> {
        self.with_parsed(|c| c.remotes.iter().find(|r| r.name == name).cloned())
    }

    fn reset(&self) {
        trace!(path = %self.path.display(), "config cache reset");
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Parse remotes and tracking branches. A missing file is an empty config.
fn load_config(path: &Path) -> Result<ParsedConfig, ConfigError> {
    if !path.is_file() {
        return Ok(ParsedConfig::default());
    }

    let file = gix::config::File::from_path_no_includes(
        path.to_path_buf(),
        gix::config::Source::Local,
    )
    .map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut remotes: Vec<ConfigRemote> = Vec::new();
    if let Some(sections) = file.sections_by_name("remote") {
        for section in sections {
            let Some(name) = section.header().subsection_name() else {
                continue;
            };
            let Some(url) = section.value("url") else {
                continue;
            };
            let name = name.to_string();
            // Later sections for the same remote win, like git
            remotes.retain(|r| r.name != name);
            remotes.push(ConfigRemote::new(name, url.to_string()));
        }
    }

    let mut branches: Vec<ConfigBranch> = Vec::new();
    if let Some(sections) = file.sections_by_name("branch") {
        for section in sections {
            let Some(name) = section.header().subsection_name() else {
                continue;
            };
            let name = name.to_string();
            let remote = section
                .value("remote")
                .and_then(|remote| {
                    let remote = remote.to_string();
                    remotes.iter().find(|r| r.name == remote).cloned()
                });
            branches.retain(|b| b.name != name);
            branches.push(ConfigBranch { name, remote });
        }
    }

    Ok(ParsedConfig { remotes, branches })
}
