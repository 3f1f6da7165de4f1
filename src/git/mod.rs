// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git layer: on-disk layout, config, refs and the two async collaborators.
//!
//! ```text
//!   paths.rs          RepositoryPaths (gitdir indirection)
//!      |
//!      +-----------+--------------+
//!      v           v              v
//!  config_store   refs.rs      watcher/
//!  (gix, read)   (leaf walk)   ChangeWatcher --> NotifyWatcher
//!      |           |              (notify, WatchEvent)
//!      +-----+-----+
//!            v
//!     ConfigBranch / ConfigRemote (types.rs)
//!
//!   gateway/    CommandGateway --> ShellGateway (git CLI, write)
//!   url.rs      remote URL host / owner / name
//! ```
//!
//! Reads go through `gix` and the filesystem; every mutation goes through
//! the git CLI so credential helpers and hooks behave as on the command line.

pub mod config_store;
pub mod gateway;
pub mod paths;
pub mod refs;
pub mod types;
pub mod url;
pub mod watcher;
