// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ConfigError, GitError, StateError, StateResult};

#[test]
fn test_config_error_display() {
    let err = ConfigError::MissingKey {
        section: "user".to_string(),
        key: "email".to_string(),
    };
    insta::assert_snapshot!(err.to_string(), @"missing required config key 'email' in section '[user]'");
}

#[test]
fn test_busy_error_display() {
    let err: StateError = GitError::Busy {
        operation: "pull".to_string(),
    }
    .into();
    insta::assert_snapshot!(
        err.to_string(),
        @"git error: repository busy: cannot start pull while another command is running"
    );
}

#[test]
fn test_is_busy() {
    let busy: StateError = GitError::Busy {
        operation: "fetch".to_string(),
    }
    .into();
    let failed: StateError = GitError::CommandFailed {
        command: "git fetch".to_string(),
        message: "boom".to_string(),
    }
    .into();

    assert!(busy.is_busy());
    assert!(!failed.is_busy());
    assert!(failed.as_git().is_some());
    assert!(failed.as_config().is_none());
}

#[test]
fn test_state_error_size() {
    // Thin Box payload plus discriminant
    let size = std::mem::size_of::<StateError>();
    assert!(size <= 16, "StateError is {size} bytes, expected <= 16");
}

#[test]
fn test_state_result_size() {
    let size = std::mem::size_of::<StateResult<()>>();
    assert!(size <= 24, "StateResult<()> is {size} bytes, expected <= 24");
}
