// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the repository manager.
//!
//! Opens real temporary repositories with the git CLI gateway, the config
//! file store and the OS file watcher.

use gitstate::config::Settings;
use gitstate::git::types::{ConfigBranch, ConfigRemote};
use gitstate::repository::{Lifecycle, RepositoryEvent, RepositoryManager};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;

const ORIGIN_URL: &str = "https://github.com/org/repo.git";

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Helper to run git commands in a directory
fn run_git(args: &[&str], cwd: &Path) -> bool {
    Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Create a repo on `main` with one commit and an `origin` remote.
fn init_test_repo(dir: &Path) {
    run_git(&["init", "-q"], dir);
    run_git(&["symbolic-ref", "HEAD", "refs/heads/main"], dir);
    run_git(&["config", "user.email", "test@test.com"], dir);
    run_git(&["config", "user.name", "Test"], dir);
    run_git(&["config", "commit.gpgsign", "false"], dir);
    fs::write(dir.join("README.md"), "# Test").unwrap();
    run_git(&["add", "."], dir);
    run_git(&["commit", "-q", "-m", "Initial commit"], dir);
    run_git(&["remote", "add", "origin", ORIGIN_URL], dir);
}

fn settings(debounce_ms: u64) -> Settings {
    Settings::parse(&format!("[status]\ndebounce_ms = {debounce_ms}\n")).unwrap()
}

async fn open(dir: &Path, debounce_ms: u64) -> RepositoryManager {
    let manager = RepositoryManager::open(dir, &settings(debounce_ms)).unwrap();
    manager.initialize().await.unwrap();
    manager
}

async fn wait_for(
    events: &mut broadcast::Receiver<RepositoryEvent>,
    pred: impl Fn(&RepositoryEvent) -> bool,
) -> RepositoryEvent {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match events.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("event bus closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

// =============================================================================
// open / initialize
// =============================================================================

#[test]
fn manager_open_rejects_plain_directory() {
    let temp = temp_dir();
    let err = RepositoryManager::open(temp.path(), &Settings::default()).unwrap_err();
    assert!(err.to_string().contains("repository not found"));
}

#[tokio::test]
async fn manager_initialize_reads_repository() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let manager = open(temp.path(), 0).await;

    let info = manager.repository().unwrap();
    assert_eq!(info.name, "repo");
    assert_eq!(info.owner.as_deref(), Some("org"));
    assert_eq!(info.clone_url.as_deref(), Some(ORIGIN_URL));
    assert_eq!(info.user.email, "test@test.com");
    assert_eq!(info.user.name, "Test");

    let origin = ConfigRemote::new("origin", ORIGIN_URL);
    assert_eq!(manager.remotes(), vec![origin.clone()]);
    assert_eq!(
        manager.current_branch(),
        Some(ConfigBranch::untracked("main"))
    );
    // Not tracking: falls back to the default remote
    assert_eq!(manager.current_remote(), Some(origin));
    assert!(manager.local_branches().contains_key("main"));
    // origin was never fetched
    assert!(manager.remote_branches().is_empty());
    assert_eq!(manager.lifecycle(), Lifecycle::Ready);
}

#[tokio::test]
async fn manager_initialize_without_origin_uses_directory_name() {
    let temp = temp_dir();
    let root = temp.path().join("plain-name");
    fs::create_dir(&root).unwrap();
    init_test_repo(&root);
    run_git(&["remote", "remove", "origin"], &root);

    let manager = open(&root, 0).await;
    let info = manager.repository().unwrap();
    assert_eq!(info.name, "plain-name");
    assert_eq!(info.owner, None);
    assert_eq!(manager.current_remote(), None);
}

#[tokio::test]
async fn manager_reads_tracking_config() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    run_git(&["config", "branch.main.remote", "origin"], temp.path());
    run_git(
        &["config", "branch.main.merge", "refs/heads/main"],
        temp.path(),
    );

    let manager = open(temp.path(), 0).await;
    assert!(manager.current_branch().unwrap().is_tracking());
}

// =============================================================================
// commands
// =============================================================================

#[tokio::test]
async fn manager_commit_files_and_status() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let manager = open(temp.path(), 0).await;

    fs::write(temp.path().join("a.txt"), "a").unwrap();
    let before = manager.status().await.unwrap();
    assert_eq!(before.entries.len(), 1);

    manager
        .commit_files(&[Path::new("a.txt").to_path_buf()], "Add a", None)
        .unwrap()
        .await
        .unwrap();
    assert!(manager.status().await.unwrap().is_clean());
    assert!(!manager.is_busy());
}

#[tokio::test]
async fn manager_switch_branch_resyncs_model() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let manager = open(temp.path(), 0).await;

    manager
        .create_branch("feature/x", "main")
        .unwrap()
        .await
        .unwrap();
    manager.switch_branch("feature/x").unwrap().await.unwrap();

    assert_eq!(
        manager.current_branch(),
        Some(ConfigBranch::untracked("feature/x"))
    );
    assert!(manager.local_branches().contains_key("feature/x"));
    assert_eq!(
        manager.head().as_deref(),
        Some("ref: refs/heads/feature/x")
    );
}

#[tokio::test]
async fn manager_failed_command_clears_busy() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let manager = open(temp.path(), 0).await;

    assert!(
        manager
            .switch_branch("does-not-exist")
            .unwrap()
            .await
            .is_err()
    );
    assert!(!manager.is_busy());
    assert_eq!(
        manager.current_branch(),
        Some(ConfigBranch::untracked("main"))
    );
}

#[tokio::test]
async fn manager_failed_switch_leaves_work_tree_alone() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let manager = open(temp.path(), 0).await;
    let readme = temp.path().join("README.md");
    fs::write(&readme, "uncommitted edit").unwrap();

    assert!(manager.switch_branch("README.md").unwrap().await.is_err());
    assert_eq!(fs::read_to_string(&readme).unwrap(), "uncommitted edit");
    assert!(!manager.is_busy());
}

#[cfg(not(windows))]
#[tokio::test]
async fn manager_remote_add_reloads_remotes() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let manager = open(temp.path(), 0).await;

    manager
        .remote_add("upstream", "https://github.com/up/repo.git")
        .unwrap()
        .await
        .unwrap();
    let names: Vec<String> = manager.remotes().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["origin", "upstream"]);
}

// =============================================================================
// watcher
// =============================================================================

#[tokio::test]
async fn manager_watcher_reports_new_branch() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let manager = open(temp.path(), 0).await;
    let mut events = manager.subscribe();
    manager.start().unwrap();

    run_git(&["branch", "topic"], temp.path());
    wait_for(&mut events, |e| *e == RepositoryEvent::LocalBranchListChanged).await;
    assert!(manager.local_branches().contains_key("topic"));

    manager.dispose();
}

#[tokio::test]
async fn manager_watcher_reports_head_change() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    run_git(&["branch", "topic"], temp.path());
    let manager = open(temp.path(), 0).await;
    let mut events = manager.subscribe();
    manager.start().unwrap();

    run_git(&["checkout", "-q", "topic"], temp.path());
    wait_for(&mut events, |e| {
        matches!(e, RepositoryEvent::ActiveBranchChanged(Some(b)) if b.name == "topic")
    })
    .await;
    assert_eq!(
        manager.current_branch(),
        Some(ConfigBranch::untracked("topic"))
    );

    manager.dispose();
}

#[tokio::test]
async fn manager_watcher_reports_work_tree_changes() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let manager = open(temp.path(), 50).await;
    let mut events = manager.subscribe();
    manager.start().unwrap();

    fs::write(temp.path().join("b.txt"), "b").unwrap();
    let event = wait_for(&mut events, |e| {
        matches!(e, RepositoryEvent::RepositoryChanged(s) if !s.is_clean())
    })
    .await;
    let RepositoryEvent::RepositoryChanged(status) = event else {
        unreachable!();
    };
    assert!(
        status
            .entries
            .iter()
            .any(|entry| entry.path == Path::new("b.txt"))
    );

    manager.dispose();
}

#[tokio::test]
async fn manager_watcher_with_relative_root() {
    // Created under the current directory so the root can be given relative
    let temp = tempfile::Builder::new()
        .prefix("gitstate-relative")
        .tempdir_in(".")
        .unwrap();
    let cwd = std::env::current_dir().unwrap();
    let relative = temp.path().strip_prefix(&cwd).unwrap();
    assert!(relative.is_relative());
    init_test_repo(temp.path());
    let manager = open(relative, 0).await;
    let mut events = manager.subscribe();
    manager.start().unwrap();

    run_git(&["branch", "topic"], temp.path());
    wait_for(&mut events, |e| *e == RepositoryEvent::LocalBranchListChanged).await;
    assert!(manager.local_branches().contains_key("topic"));

    manager.dispose();
}

#[tokio::test]
async fn manager_stop_and_dispose_are_idempotent() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let manager = open(temp.path(), 0).await;

    manager.start().unwrap();
    manager.stop();
    manager.stop();
    assert_eq!(manager.lifecycle(), Lifecycle::Stopped);

    manager.dispose();
    manager.dispose();
    assert_eq!(manager.lifecycle(), Lifecycle::Disposed);
    assert!(manager.fetch("origin").is_err());
}
