// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   config (options, configs), inspect (branches, status), watch
//! ```

pub mod config;
pub mod inspect;
pub mod watch;

#[cfg(test)]
mod tests;

use anyhow::Context;
use std::path::Path;

use crate::config::Settings;
use crate::error::Result;
use crate::repository::RepositoryManager;

/// Open and initialize the repository at `path`.
async fn open_repository(path: &Path, settings: &Settings) -> Result<RepositoryManager> {
    let manager = RepositoryManager::open(path, settings)
        .with_context(|| format!("failed to open repository at {}", path.display()))?;
    manager
        .initialize()
        .await
        .with_context(|| format!("failed to load repository at {}", path.display()))?;
    Ok(manager)
}
