// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!        StateError (16 bytes)
//!               |
//!   +-------+---+---+--------+
//!   |       |       |        |
//!   v       v       v        v
//!  Git     Cfg    Proc    Watcher
//!  Box     Box    Box      Box
//!
//! Sub-errors (unboxed internally):
//!   Git      Busy, CommandFailed, NotInitialized, Disposed, Canceled
//!   Config   ParseError, MissingKey, InvalidValue
//!   Process  ExecutableNotFound, SpawnFailed, OutputError
//!   Watcher  Create, WatchPath, NotInitialized
//! ```
//!
//! Busy violations are the only errors a wrapped command reports at call
//! time; everything else travels through the command's completion.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`StateError`].
pub type StateResult<T> = std::result::Result<T, StateError>;

/// Top-level error type.
///
/// All sub-errors are boxed to keep this enum at two words on the stack.
#[derive(Debug, Error)]
pub enum StateError {
    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// Filesystem watcher error.
    #[error("watcher error: {0}")]
    Watcher(#[from] Box<WatcherError>),
}

impl StateError {
    /// Returns true if this is a busy-gate violation.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Git(e) if matches!(**e, GitError::Busy { .. }))
    }

    /// Returns the git sub-error, if any.
    #[must_use]
    pub fn as_git(&self) -> Option<&GitError> {
        match self {
            Self::Git(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the config sub-error, if any.
    #[must_use]
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for StateError {
                fn from(err: $error) -> Self {
                    StateError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    ConfigError => Config,
    ProcessError => Process,
    WatcherError => Watcher,
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Another mutating command is still in flight.
    #[error("repository busy: cannot start {operation} while another command is running")]
    Busy { operation: String },

    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Repository manager used before `initialize` completed.
    #[error("repository not initialized")]
    NotInitialized,

    /// Repository manager used after `dispose`.
    #[error("repository manager disposed")]
    Disposed,

    /// The task driving a command went away before it completed.
    #[error("{operation} was canceled before completion")]
    Canceled { operation: String },

    /// Repository not found at the specified path.
    #[error("repository not found: {path}")]
    RepoNotFound { path: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read or decode process output.
    #[error("failed to read output from process '{command}': {message}")]
    OutputError { command: String, message: String },
}

// --- Watcher Errors ---

/// Filesystem watcher errors.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// Failed to create the OS watcher.
    #[error("failed to create watcher: {0}")]
    Create(#[source] notify::Error),

    /// Failed to watch a path.
    #[error("failed to watch {}: {source}", path.display())]
    WatchPath {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// `start` called before `initialize`.
    #[error("watcher started before initialization")]
    NotInitialized,
}

#[cfg(test)]
mod tests;
