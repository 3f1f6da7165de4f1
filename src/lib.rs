// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |           watch / branches / status
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |        repository         |
//!              |  state, busy gate, events |
//!              '--+-----------+--------+---'
//!                 |           |        |
//!                 v           v        v
//!             gateway      watcher   config_store
//!             git CLI      notify    gix::config
//!                 \           |        /
//!                  +---- git: paths, refs ----+
//!
//!   +-----------------------------------------+
//!   |  config   TOML, layered settings        |
//!   +-----------------------------------------+
//!   |  foundation   error, logging, utility   |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod repository;
pub mod utility;
