// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! [`CommandGateway`] over the git CLI.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{GitError, ProcessError, StateResult};
use crate::git::types::{RepositoryLock, RepositoryStatus};

use super::{CommandGateway, parse};

/// Exit code of `git config --get` for an unset key.
const CONFIG_KEY_UNSET: i32 = 1;

#[derive(Debug)]
struct GitCli {
    executable: PathBuf,
    work_tree: PathBuf,
}

/// Raw result of one git invocation.
#[derive(Debug)]
struct GitOutput {
    command: String,
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl GitOutput {
    fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn into_checked(self) -> StateResult<String> {
        if self.success() {
            return Ok(self.stdout.trim_end().to_string());
        }
        let message = if self.stderr.trim().is_empty() {
            self.code
                .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}"))
        } else {
            self.stderr.trim().to_string()
        };
        Err(GitError::CommandFailed {
            command: self.command,
            message,
        }
        .into())
    }
}

impl GitCli {
    /// Run git in the working tree. Sets `GCM_INTERACTIVE=never` and
    /// `GIT_TERMINAL_PROMPT=0` so credential prompts fail instead of hanging.
    async fn run(&self, args: Vec<String>) -> StateResult<GitOutput> {
        let command = format!("git {}", args.join(" "));
        debug!(cwd = %self.work_tree.display(), cmd = %command, "exec");

        let output = Command::new(&self.executable)
            .args(&args)
            .current_dir(&self.work_tree)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProcessError::SpawnFailed {
                command: command.clone(),
                source,
            })?;

        let code = output.status.code();
        trace!(cmd = %command, exit_code = ?code, "completed");

        Ok(GitOutput {
            command,
            code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_checked(&self, args: Vec<String>) -> StateResult<String> {
        self.run(args).await?.into_checked()
    }
}

/// Runs every command as a `git` subprocess in the working tree.
#[derive(Debug, Clone)]
pub struct ShellGateway {
    cli: Arc<GitCli>,
}

impl ShellGateway {
    /// Gateway for `work_tree`. Without an explicit `executable`, `git` is
    /// looked up on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::ExecutableNotFound`] if no git binary is found.
    pub fn new(work_tree: impl Into<PathBuf>, executable: Option<&Path>) -> StateResult<Self> {
        let executable = match executable {
            Some(path) => path.to_path_buf(),
            None => which::which("git").map_err(|_| ProcessError::ExecutableNotFound {
                name: "git".to_string(),
            })?,
        };

        Ok(Self {
            cli: Arc::new(GitCli {
                executable,
                work_tree: work_tree.into(),
            }),
        })
    }

    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.cli.executable
    }

    #[must_use]
    pub fn work_tree(&self) -> &Path {
        &self.cli.work_tree
    }

    fn checked(&self, args: Vec<String>) -> BoxFuture<'static, StateResult<String>> {
        let cli = Arc::clone(&self.cli);
        async move { cli.run_checked(args).await }.boxed()
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl CommandGateway for ShellGateway {
    fn add(&self, paths: &[PathBuf]) -> BoxFuture<'static, StateResult<String>> {
        let mut argv = args(["add", "--"]);
        argv.extend(paths.iter().map(|p| path_arg(p)));
        self.checked(argv)
    }

    fn commit(&self, message: &str, body: Option<&str>) -> BoxFuture<'static, StateResult<String>> {
        let mut argv = args(["commit", "-m", message]);
        if let Some(body) = body.filter(|b| !b.trim().is_empty()) {
            argv.extend(args(["-m", body]));
        }
        self.checked(argv)
    }

    fn fetch(&self, remote: &str) -> BoxFuture<'static, StateResult<String>> {
        self.checked(args(["fetch", remote]))
    }

    fn pull(&self, remote: &str, branch: &str) -> BoxFuture<'static, StateResult<String>> {
        self.checked(args(["pull", remote, branch]))
    }

    fn push(&self, remote: &str, branch: &str) -> BoxFuture<'static, StateResult<String>> {
        self.checked(args(["push", remote, branch]))
    }

    fn remote_add(&self, name: &str, url: &str) -> BoxFuture<'static, StateResult<String>> {
        self.checked(args(["remote", "add", name, url]))
    }

    fn remote_remove(&self, name: &str) -> BoxFuture<'static, StateResult<String>> {
        self.checked(args(["remote", "remove", name]))
    }

    fn remote_change(&self, name: &str, url: &str) -> BoxFuture<'static, StateResult<String>> {
        self.checked(args(["remote", "set-url", name, url]))
    }

    fn switch_branch(&self, branch: &str) -> BoxFuture<'static, StateResult<String>> {
        // Trailing "--" keeps a name that is also a path from restoring that file
        self.checked(args(["checkout", branch, "--"]))
    }

    fn create_branch(&self, branch: &str, base: &str) -> BoxFuture<'static, StateResult<String>> {
        self.checked(args(["branch", branch, base]))
    }

    fn delete_branch(&self, branch: &str, force: bool) -> BoxFuture<'static, StateResult<String>> {
        let flag = if force { "-D" } else { "-d" };
        self.checked(args(["branch", flag, branch]))
    }

    fn lock_file(&self, path: &Path) -> BoxFuture<'static, StateResult<String>> {
        self.checked(args(["lfs", "lock", &path_arg(path)]))
    }

    fn unlock_file(&self, path: &Path, force: bool) -> BoxFuture<'static, StateResult<String>> {
        let mut argv = args(["lfs", "unlock"]);
        if force {
            argv.push("--force".to_string());
        }
        argv.push(path_arg(path));
        self.checked(argv)
    }

    fn list_locks(&self, local: bool) -> BoxFuture<'static, StateResult<Vec<RepositoryLock>>> {
        let mut argv = args(["lfs", "locks"]);
        if local {
            argv.push("--local".to_string());
        }
        argv.push("--json".to_string());

        let cli = Arc::clone(&self.cli);
        async move {
            let stdout = cli.run_checked(argv).await?;
            Ok(parse::lfs_locks(&stdout)?)
        }
        .boxed()
    }

    fn status(&self) -> BoxFuture<'static, StateResult<RepositoryStatus>> {
        let argv = args(["status", "--porcelain=v1", "--branch", "-z", "-uall"]);
        let cli = Arc::clone(&self.cli);
        async move {
            let output = cli.run(argv).await?;
            if !output.success() {
                return output.into_checked().map(|_| RepositoryStatus::default());
            }
            Ok(parse::status_porcelain(&output.stdout))
        }
        .boxed()
    }

    fn get_config(&self, key: &str) -> BoxFuture<'static, StateResult<Option<String>>> {
        let argv = args(["config", "--get", key]);
        let cli = Arc::clone(&self.cli);
        async move {
            let output = cli.run(argv).await?;
            if output.code == Some(CONFIG_KEY_UNSET) {
                return Ok(None);
            }
            let value = output.into_checked()?;
            Ok(Some(value.trim().to_string()).filter(|v| !v.is_empty()))
        }
        .boxed()
    }
}
