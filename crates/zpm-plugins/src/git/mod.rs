//! Plugins cloned from a git remote.
//!
//! Two spec formats produce a [`GitPlugin`]:
//! - `github:account/repo[@rev]`, cloned from `https://github.com/account/repo`
//! - `git:https://host/path.git[@rev]` (or `ssh://`)
//!
//! All repository access goes through the `git` binary. A check resolves the
//! required revision and remembers the resulting commit; the install that
//! follows checks that commit out.

mod command;
pub mod resolve;
mod remote;
pub mod validate;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

pub use remote::{GitRemote, split_ref};

use crate::dir::DirPlugin;
use crate::error::{PluginError, PluginResult};
use crate::plugin::{Installation, Load, LoadScript, Upgrade, UpdateCheck};

/// Revision used when a spec names none: whatever branch the remote's `HEAD`
/// points at.
pub const DEFAULT_REVISION: &str = "HEAD";

/// Time budgets for remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitOptions {
    /// Upper bound for `git fetch`.
    pub fetch_timeout: Duration,
    /// Upper bound for `git clone`.
    pub clone_timeout: Duration,
}

impl Default for GitOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(60),
            clone_timeout: Duration::from_secs(300),
        }
    }
}

/// A full commit id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitHash(String);

impl CommitHash {
    /// Accept a full SHA-1 or SHA-256 hex id.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let valid = matches!(s.len(), 40 | 64) && s.bytes().all(|b| b.is_ascii_hexdigit());
        valid.then(|| Self(s.to_ascii_lowercase()))
    }

    /// The full id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The abbreviated id shown to users.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for CommitHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a revision names a ref or a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    /// The remote's default branch, tracked through `origin/HEAD`.
    DefaultBranch,
    /// A branch or tag.
    Named,
    /// A (possibly abbreviated) commit id.
    Commit,
}

/// The revision a git plugin must be at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredRevision {
    name: String,
    kind: RevisionKind,
}

impl RequiredRevision {
    /// Classify `name`. An empty name or [`DEFAULT_REVISION`] means the
    /// remote's default branch; 7 to 64 hex digits are taken as a commit id.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid git ref.
    pub fn new(name: &str) -> PluginResult<Self> {
        if name.is_empty() || name == DEFAULT_REVISION {
            return Ok(Self::default());
        }
        validate::validate_git_ref(name)?;
        let is_commit =
            (7..=64).contains(&name.len()) && name.bytes().all(|b| b.is_ascii_hexdigit());
        Ok(Self {
            name: name.to_string(),
            kind: if is_commit {
                RevisionKind::Commit
            } else {
                RevisionKind::Named
            },
        })
    }

    /// The revision as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default branch, branch/tag or commit.
    #[must_use]
    pub fn kind(&self) -> RevisionKind {
        self.kind
    }
}

impl Default for RequiredRevision {
    fn default() -> Self {
        Self {
            name: DEFAULT_REVISION.to_string(),
            kind: RevisionKind::DefaultBranch,
        }
    }
}

impl std::fmt::Display for RequiredRevision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A plugin living in a local clone of a git repository.
#[derive(Debug)]
pub struct GitPlugin {
    dir: DirPlugin,
    remote: GitRemote,
    revision: RequiredRevision,
    options: GitOptions,
    pending: Option<CommitHash>,
}

impl GitPlugin {
    /// Create a plugin cloned into `path`.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        remote: GitRemote,
        revision: RequiredRevision,
        options: GitOptions,
    ) -> Self {
        Self {
            dir: DirPlugin::new(path),
            remote,
            revision,
            options,
            pending: None,
        }
    }

    /// The clone location.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the clone comes from.
    #[must_use]
    pub fn remote(&self) -> &GitRemote {
        &self.remote
    }

    /// The revision the clone must be at.
    #[must_use]
    pub fn revision(&self) -> &RequiredRevision {
        &self.revision
    }

    /// Replace the required revision. Drops any commit found by an earlier
    /// check since it was resolved for the old revision.
    pub fn set_revision(&mut self, revision: RequiredRevision) {
        self.revision = revision;
        self.pending = None;
    }

    /// The commit found by the last check, not yet checked out.
    #[must_use]
    pub fn pending(&self) -> Option<&CommitHash> {
        self.pending.as_ref()
    }

    /// Whether a clone exists at [`GitPlugin::path`].
    #[must_use]
    pub fn is_cloned(&self) -> bool {
        self.path().join(".git").exists()
    }

    async fn clone_fresh(&self) -> PluginResult<()> {
        let path = self.path();
        let existed = path.exists();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(remote = %self.remote, revision = %self.revision, path = %path.display(), "Cloning plugin");
        let result = resolve::clone(
            &self.remote.url(),
            path,
            &self.revision,
            self.options.clone_timeout,
        )
        .await;

        if result.is_err()
            && !existed
            && let Err(e) = tokio::fs::remove_dir_all(path).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %path.display(), error = %e, "Failed to remove partial clone");
        }
        result
    }
}

impl Load for GitPlugin {
    fn load(&self) -> PluginResult<LoadScript> {
        if !self.is_cloned() {
            return Err(PluginError::NotInstalled);
        }
        self.dir.load()
    }

    fn is_installed(&self) -> PluginResult<Installation> {
        Ok(if self.is_cloned() {
            Installation::Installed
        } else {
            Installation::Missing
        })
    }
}

#[async_trait]
impl Upgrade for GitPlugin {
    async fn check_update(&mut self, offline: bool) -> PluginResult<UpdateCheck> {
        if !self.is_cloned() {
            return Err(PluginError::NotInstalled);
        }
        let path = self.path().to_path_buf();

        let current = resolve::head(&path).await?;
        if !offline {
            resolve::fetch(&path, &self.revision, self.options.fetch_timeout).await?;
        }
        let target = resolve::resolve(&path, &self.revision).await?;

        if target == current {
            debug!(path = %path.display(), revision = %self.revision, "Up to date");
            self.pending = None;
            return Ok(UpdateCheck::UpToDate);
        }

        let message = format!(
            "{}: update from {} to {}",
            self.revision,
            current.short(),
            target.short()
        );
        self.pending = Some(target);
        Ok(UpdateCheck::Available(message))
    }

    async fn install_update(&mut self) -> PluginResult<()> {
        if !self.is_cloned() {
            self.clone_fresh().await?;
            self.pending = None;
            return Ok(());
        }

        let Some(target) = self.pending.clone() else {
            return Err(PluginError::NoUpdateAvailable);
        };
        resolve::checkout(self.path(), &target).await?;
        info!(path = %self.path().display(), commit = %target.short(), "Checked out update");
        self.pending = None;
        Ok(())
    }
}
