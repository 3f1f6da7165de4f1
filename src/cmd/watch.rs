// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Watch command: follow a repository until Ctrl-C.

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::cli::repo::WatchArgs;
use crate::config::Settings;
use crate::error::Result;

use super::open_repository;

/// Main handler for the watch command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or loaded, or the
/// file watcher cannot be started.
pub async fn run_watch_command(args: &WatchArgs, settings: &Settings) -> Result<()> {
    let manager = open_repository(&args.repo.path, settings).await?;
    let mut events = manager.subscribe();

    if let Some(info) = manager.repository() {
        println!("{} ({})", info.name, info.local_path.display());
        println!("user: {}", info.user);
    }
    match manager.current_branch() {
        Some(branch) => println!("on {branch}"),
        None => println!("HEAD detached"),
    }

    if settings.watcher.enabled && !args.no_watcher {
        manager.start()?;
    } else {
        info!("file watcher disabled");
    }
    manager.refresh();

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            result = &mut interrupted => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to listen for Ctrl+C");
                }
                break;
            }
            received = events.recv() => match received {
                Ok(event) => println!("{event}"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event output lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    manager.dispose();
    Ok(())
}
