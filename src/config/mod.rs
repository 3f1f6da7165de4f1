// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Application settings.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. gitstate.toml (cwd, optional)
//! 3. --config FILE (repeatable)
//! 4. GITSTATE_* env vars
//! 5. --set overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! GITSTATE_STATUS__DEBOUNCE_MS=0           → status.debounce_ms = 0
//! GITSTATE_REPOSITORY__CANONICAL_HOST=x.io → repository.canonical_host = "x.io"
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::{EventSettings, GitSettings, RepositorySettings, StatusSettings, WatcherSettings};

/// Longest accepted status debounce window.
const MAX_DEBOUNCE_MS: u64 = 60_000;

/// Complete application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub git: GitSettings,
    pub status: StatusSettings,
    pub repository: RepositorySettings,
    pub events: EventSettings,
    pub watcher: WatcherSettings,
}

impl Settings {
    /// Create a new settings loader.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gitstate::config::Settings;
    ///
    /// let settings = Settings::builder()
    ///     .add_toml_file_optional("gitstate.toml")
    ///     .with_env_prefix("GITSTATE")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load settings from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or fails validation.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validate cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` naming the first offending key.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.events.capacity == 0 {
            return Err(invalid("events", "capacity", "must be greater than 0"));
        }
        if self.status.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(invalid(
                "status",
                "debounce_ms",
                &format!("must be at most {MAX_DEBOUNCE_MS}"),
            ));
        }
        if self.repository.canonical_host.trim().is_empty() {
            return Err(invalid("repository", "canonical_host", "must not be empty"));
        }
        if self.repository.default_remote.trim().is_empty() {
            return Err(invalid("repository", "default_remote", "must not be empty"));
        }
        Ok(())
    }

    /// Format settings for display as `key = value` lines.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let executable = self
            .git
            .executable
            .as_ref()
            .map_or_else(|| "<PATH>".to_string(), |p| p.display().to_string());
        let options = [
            ("events.capacity", self.events.capacity.to_string()),
            ("git.executable", executable),
            (
                "repository.canonical_host",
                self.repository.canonical_host.clone(),
            ),
            (
                "repository.default_remote",
                self.repository.default_remote.clone(),
            ),
            ("status.debounce_ms", self.status.debounce_ms.to_string()),
            ("watcher.enabled", self.watcher.enabled.to_string()),
        ];

        let width = options.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        options
            .iter()
            .map(|(key, value)| format!("{key:<width$} = {value}"))
            .collect()
    }
}

fn invalid(section: &str, key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        message: message.to_string(),
    }
}
