// gitstate-rs: Repository state reconciliation core
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote URL parsing.
//!
//! ```text
//! https://host[:port]/owner/name[.git]
//! ssh://[user@]host[:port]/owner/name[.git]
//! [user@]host:owner/name[.git]          (scp-like)
//! ```

use regex::Regex;
use std::sync::OnceLock;

use super::types::ConfigRemote;

/// `scheme://[user@]host[:port]/path`
fn scheme_url() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://(?:[^@/]+@)?([^/:]+)(?::[0-9]+)?/(.+)$").ok()
        })
        .as_ref()
}

/// `[user@]host:path`
fn scp_url() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(?:[^@/]+@)?([^/:]+):(.+)$").ok())
        .as_ref()
}

/// Host and repository path components of a remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    pub host: String,
    pub owner: Option<String>,
    pub name: String,
}

impl RemoteUrl {
    /// Parse a remote URL. Local paths and `file://` URLs yield `None`.
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        if url.starts_with("file://") {
            return None;
        }

        let captures = scheme_url()?
            .captures(url)
            .or_else(|| scp_url().and_then(|re| re.captures(url)))?;
        let host = captures.get(1)?.as_str();
        let path = captures.get(2)?.as_str().trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        if path.is_empty() {
            return None;
        }

        let (owner, name) = match path.rsplit_once('/') {
            Some((owner, name)) => (Some(owner.to_string()), name.to_string()),
            None => (None, path.to_string()),
        };

        Some(Self {
            host: host.to_ascii_lowercase(),
            owner,
            name,
        })
    }

    #[must_use]
    pub fn is_host(&self, host: &str) -> bool {
        self.host.eq_ignore_ascii_case(host)
    }
}

/// First remote, in iteration order, whose URL points at `host`.
#[must_use]
pub fn find_canonical_remote<'a>(
    remotes: &'a [ConfigRemote],
    host: &str,
) -> Option<(&'a ConfigRemote, RemoteUrl)> {
    remotes.iter().find_map(|remote| {
        RemoteUrl::parse(&remote.url)
            .filter(|url| url.is_host(host))
            .map(|url| (remote, url))
    })
}
