// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities.
//!
//! ```text
//! walk:  parallel_walk()  ignore::WalkParallel (multi-core)
//!        WalkOptions      hidden, gitignore
//! ```

pub mod walk;

#[cfg(test)]
mod tests;
