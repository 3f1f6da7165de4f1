// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parsers for git command output.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ProcessError;
use crate::git::types::{RepositoryLock, RepositoryStatus, StatusEntry};

const HEADER_PREFIX: &str = "## ";
const NO_BRANCH: &str = "HEAD (no branch)";
const UNBORN_PREFIXES: [&str; 2] = ["No commits yet on ", "Initial commit on "];

/// Parse `git status --porcelain=v1 --branch -z` output.
///
/// Records are NUL-terminated. A rename or copy record is followed by an
/// extra record holding the source path.
#[must_use]
pub fn status_porcelain(output: &str) -> RepositoryStatus {
    let mut status = RepositoryStatus::default();
    let mut records = output.split('\0').filter(|r| !r.is_empty());

    while let Some(record) = records.next() {
        if let Some(header) = record.strip_prefix(HEADER_PREFIX) {
            apply_branch_header(header, &mut status);
            continue;
        }

        let mut chars = record.chars();
        let (Some(index), Some(work_tree), Some(' ')) = (chars.next(), chars.next(), chars.next())
        else {
            continue;
        };
        let path = chars.as_str();
        if path.is_empty() {
            continue;
        }

        let original_path = if matches!(index, 'R' | 'C') || matches!(work_tree, 'R' | 'C') {
            records.next().map(PathBuf::from)
        } else {
            None
        };

        status.entries.push(StatusEntry {
            path: PathBuf::from(path),
            original_path,
            index,
            work_tree,
        });
    }

    status
}

/// `main...origin/main [ahead 1, behind 2]`
fn apply_branch_header(header: &str, status: &mut RepositoryStatus) {
    let header = UNBORN_PREFIXES
        .iter()
        .find_map(|prefix| header.strip_prefix(prefix))
        .unwrap_or(header);

    let (refs, counts) = match header.split_once(" [") {
        Some((refs, counts)) => (refs, Some(counts.trim_end_matches(']'))),
        None => (header, None),
    };

    if refs != NO_BRANCH {
        match refs.split_once("...") {
            Some((local, upstream)) => {
                status.local_branch = Some(local.to_string());
                status.remote_branch = Some(upstream.to_string());
            }
            None => status.local_branch = Some(refs.to_string()),
        }
    }

    for part in counts.into_iter().flat_map(|c| c.split(", ")) {
        if let Some(n) = part.strip_prefix("ahead ") {
            status.ahead = n.trim().parse().unwrap_or(0);
        } else if let Some(n) = part.strip_prefix("behind ") {
            status.behind = n.trim().parse().unwrap_or(0);
        }
    }
}

#[derive(Debug, Deserialize)]
struct LfsLock {
    id: String,
    path: String,
    #[serde(default)]
    owner: Option<LfsOwner>,
    #[serde(default)]
    locked_at: String,
}

#[derive(Debug, Deserialize)]
struct LfsOwner {
    name: String,
}

/// Parse `git lfs locks --json` output. Empty output means no locks.
///
/// # Errors
///
/// Returns [`ProcessError::OutputError`] if the output is not the expected
/// JSON array.
pub fn lfs_locks(output: &str) -> Result<Vec<RepositoryLock>, ProcessError> {
    let output = output.trim();
    if output.is_empty() {
        return Ok(Vec::new());
    }

    let locks: Vec<LfsLock> =
        serde_json::from_str(output).map_err(|e| ProcessError::OutputError {
            command: "git lfs locks --json".to_string(),
            message: e.to_string(),
        })?;

    Ok(locks
        .into_iter()
        .map(|lock| RepositoryLock {
            id: lock.id,
            path: PathBuf::from(lock.path),
            owner: lock.owner.map(|o| o.name).unwrap_or_default(),
            locked_at: lock.locked_at,
        })
        .collect())
}
