// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use bon::Builder;
use flume::bounded;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Options for parallel directory traversal.
#[derive(Debug, Clone, Builder)]
pub struct WalkOptions {
    /// Include hidden files/directories
    #[builder(setters(name = with_include_hidden), default = false)]
    include_hidden: bool,
    /// Respect .gitignore and .ignore files
    #[builder(setters(name = with_respect_gitignore), default = true)]
    respect_gitignore: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WalkOptions {
    #[must_use]
    pub const fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    #[must_use]
    pub const fn respect_gitignore(&self) -> bool {
        self.respect_gitignore
    }

    /// Options for scanning git metadata: every entry counts, nothing is
    /// filtered by ignore rules or hidden-ness.
    #[must_use]
    pub fn for_git_metadata() -> Self {
        Self::builder()
            .with_include_hidden(true)
            .with_respect_gitignore(false)
            .build()
    }
}

/// Files found by a parallel walk, plus the number of entries that could
/// not be read.
#[derive(Debug)]
pub struct WalkResult {
    files: Vec<PathBuf>,
    error_count: usize,
}

impl WalkResult {
    /// Entries that failed to read. Their subtrees are missing from the files.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }

    /// Consumes the result, returning the files.
    #[must_use]
    pub fn into_files(self) -> Vec<PathBuf> {
        self.files
    }
}

/// Builds a `WalkBuilder` with the given options.
fn build_walker(root: &Path, options: &WalkOptions) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder.hidden(!options.include_hidden());

    let respect = options.respect_gitignore();
    builder.git_ignore(respect);
    builder.git_global(respect);
    builder.git_exclude(respect);
    builder.ignore(respect);
    builder.parents(respect);

    builder
}

/// Performs parallel directory traversal using `ignore::WalkParallel`.
///
/// Uses flume channels for lock-free result collection. Result order is
/// unspecified; callers sort when they need determinism.
///
/// # Errors
///
/// Returns an error if the root directory does not exist.
///
/// # Example
/// ```no_run
/// use gitstate::utility::fs::walk::{parallel_walk, WalkOptions};
///
/// let result = parallel_walk(".git/refs/heads", &WalkOptions::for_git_metadata())?;
/// println!("Found {} refs", result.into_files().len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn parallel_walk<P: AsRef<Path>>(root: P, options: &WalkOptions) -> Result<WalkResult> {
    let root = root.as_ref();

    if !root.exists() {
        anyhow::bail!("root directory does not exist: {}", root.display());
    }

    // Bounded so huge trees cannot exhaust memory before collection starts
    let (file_tx, file_rx) = bounded::<PathBuf>(1000);
    let error_count = Arc::new(AtomicUsize::new(0));

    let parallel = build_walker(root, options).build_parallel();

    // Collect on the calling side while the walkers run
    let files = std::thread::scope(|scope| {
        let files = scope.spawn(|| file_rx.iter().collect::<Vec<_>>());

        parallel.run(|| {
            let file_tx = file_tx.clone();
            let error_count = Arc::clone(&error_count);

            Box::new(move |entry_result| {
                match entry_result {
                    Ok(entry) => {
                        if entry.file_type().is_some_and(|ft| ft.is_file()) {
                            let _ = file_tx.send(entry.into_path());
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "walk error");
                        error_count.fetch_add(1, Ordering::Relaxed);
                    }
                }
                ignore::WalkState::Continue
            })
        });

        // Drop the sender to signal completion
        drop(file_tx);
        files.join().unwrap_or_default()
    });

    Ok(WalkResult {
        files,
        error_count: error_count.load(Ordering::Relaxed),
    })
}
