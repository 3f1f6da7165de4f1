// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cmd::inspect::{format_branches, format_status};
use crate::git::refs::{LocalBranches, RemoteBranches};
use crate::git::types::{ConfigBranch, ConfigRemote, RepositoryStatus, StatusEntry};

fn origin() -> ConfigRemote {
    ConfigRemote::new("origin", "https://github.com/org/repo.git")
}

#[test]
fn test_format_branches_marks_active() {
    let local: LocalBranches = [
        ("feature/x".to_string(), ConfigBranch::untracked("feature/x")),
        ("main".to_string(), ConfigBranch::tracking("main", origin())),
    ]
    .into_iter()
    .collect();
    let remote: RemoteBranches = [(
        "origin".to_string(),
        BTreeMap::from([("main".to_string(), ConfigBranch::tracking("main", origin()))]),
    )]
    .into_iter()
    .collect();

    let lines = format_branches(
        &local,
        Some(&remote),
        Some(&ConfigBranch::tracking("main", origin())),
    );
    assert_eq!(
        lines,
        vec!["  feature/x", "* main -> origin", "  origin/main"]
    );
}

#[test]
fn test_format_branches_detached_local_only() {
    let local: LocalBranches = [("main".to_string(), ConfigBranch::untracked("main"))]
        .into_iter()
        .collect();
    let lines = format_branches(&local, None, None);
    assert_eq!(lines, vec!["  main"]);
}

#[test]
fn test_format_status() {
    let status = RepositoryStatus {
        local_branch: Some("main".to_string()),
        remote_branch: Some("origin/main".to_string()),
        ahead: 1,
        behind: 2,
        entries: vec![
            StatusEntry {
                path: PathBuf::from("src/lib.rs"),
                original_path: None,
                index: 'M',
                work_tree: ' ',
            },
            StatusEntry {
                path: PathBuf::from("new.rs"),
                original_path: Some(PathBuf::from("old.rs")),
                index: 'R',
                work_tree: ' ',
            },
            StatusEntry {
                path: PathBuf::from("notes.txt"),
                original_path: None,
                index: '?',
                work_tree: '?',
            },
        ],
    };
    insta::assert_snapshot!(format_status(&status).join("\n"), @r"
    ## main...origin/main [ahead 1, behind 2]
    M  src/lib.rs
    R  old.rs -> new.rs
    ?? notes.txt
    ");
}

#[test]
fn test_format_status_detached_clean() {
    let status = RepositoryStatus::default();
    assert_eq!(format_status(&status), vec!["## HEAD (no branch)"]);
}
