// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::walk::{WalkOptions, parallel_walk};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

#[test]
fn test_parallel_walk() {
    let temp = temp_dir();

    std::fs::create_dir(temp.path().join("subdir")).unwrap();
    std::fs::write(temp.path().join("file1.txt"), "").unwrap();
    std::fs::write(temp.path().join("subdir/file2.txt"), "").unwrap();

    let result = parallel_walk(temp.path(), &WalkOptions::default()).unwrap();

    assert_eq!(result.error_count(), 0);
    let mut files = result.into_files();
    files.sort();
    assert_eq!(
        files,
        vec![
            temp.path().join("file1.txt"),
            temp.path().join("subdir/file2.txt"),
        ]
    );
}

#[test]
fn test_parallel_walk_missing_root() {
    let temp = temp_dir();
    let result = parallel_walk(temp.path().join("nope"), &WalkOptions::default());
    assert!(result.is_err());
}

#[test]
fn test_git_metadata_options_include_hidden_and_ignored() {
    let temp = temp_dir();

    std::fs::write(temp.path().join(".ignore"), "ignored\n").unwrap();
    std::fs::write(temp.path().join("ignored"), "").unwrap();
    std::fs::write(temp.path().join(".hidden"), "").unwrap();

    let default_files = parallel_walk(temp.path(), &WalkOptions::default())
        .unwrap()
        .into_files();
    assert!(default_files.is_empty());

    let mut names: Vec<String> = parallel_walk(temp.path(), &WalkOptions::for_git_metadata())
        .unwrap()
        .into_files()
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
        .collect();
    names.sort();
    assert_eq!(names, vec![".hidden", ".ignore", "ignored"]);
}

#[test]
fn test_parallel_walk_many_files() {
    let temp = temp_dir();
    for i in 0..1500 {
        std::fs::write(temp.path().join(format!("f{i}")), "").unwrap();
    }

    let result = parallel_walk(temp.path(), &WalkOptions::default()).unwrap();
    assert_eq!(result.into_files().len(), 1500);
}

#[cfg(unix)]
#[test]
fn test_parallel_walk_counts_unreadable_dirs() {
    use std::os::unix::fs::PermissionsExt;

    let temp = temp_dir();
    let sealed = temp.path().join("sealed");
    std::fs::create_dir(&sealed).unwrap();
    std::fs::write(sealed.join("inner"), "").unwrap();
    std::fs::write(temp.path().join("open"), "").unwrap();
    std::fs::set_permissions(&sealed, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users read through the mode bits
    let readable = std::fs::read_dir(&sealed).is_ok();
    let result = parallel_walk(temp.path(), &WalkOptions::for_git_metadata()).unwrap();
    std::fs::set_permissions(&sealed, std::fs::Permissions::from_mode(0o755)).unwrap();
    if readable {
        return;
    }

    assert_eq!(result.error_count(), 1);
    assert_eq!(result.into_files(), vec![temp.path().join("open")]);
}
