//! Revision resolution and working-tree updates for a local clone.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use super::command::Git;
use super::{CommitHash, RequiredRevision, RevisionKind};
use crate::error::{PluginError, PluginResult};

/// The commit currently checked out.
///
/// # Errors
///
/// Returns [`PluginError::HeadUnreadable`] if `HEAD` does not name a commit.
pub async fn head(repo: &Path) -> PluginResult<CommitHash> {
    let out = Git::new(["rev-parse", "--verify", "HEAD^{commit}"])
        .current_dir(repo)
        .output()
        .await
        .map_err(|e| PluginError::HeadUnreadable {
            path: repo.to_path_buf(),
            message: e.to_string(),
        })?;
    CommitHash::parse(&out).ok_or_else(|| PluginError::HeadUnreadable {
        path: repo.to_path_buf(),
        message: format!("unexpected rev-parse output '{out}'"),
    })
}

/// Every remote branch, so a single-branch clone can move to another branch.
const BRANCH_REFSPEC: &str = "+refs/heads/*:refs/remotes/origin/*";

/// Fetch all branches and tags from `origin`.
///
/// For the default branch `origin/HEAD` is re-read from the remote as well,
/// so a renamed upstream default is followed.
///
/// # Errors
///
/// Returns an error if git fails or either step exceeds `limit`.
pub async fn fetch(repo: &Path, revision: &RequiredRevision, limit: Duration) -> PluginResult<()> {
    Git::new(["fetch", "--quiet", "--tags", "origin", BRANCH_REFSPEC])
        .current_dir(repo)
        .output_within(limit)
        .await?;
    if revision.kind() == RevisionKind::DefaultBranch {
        Git::new(["remote", "set-head", "origin", "--auto"])
            .current_dir(repo)
            .output_within(limit)
            .await?;
    }
    Ok(())
}

/// Resolve `revision` to a commit using only what is stored locally.
///
/// The default branch is `origin/HEAD`. Otherwise tried in order: the
/// remote-tracking branch `origin/<rev>`, a local tag, a local branch, and
/// finally `<rev>` as a commit id whose object must exist.
///
/// # Errors
///
/// Returns [`PluginError::RevisionNotFound`] when nothing matches.
pub async fn resolve(repo: &Path, revision: &RequiredRevision) -> PluginResult<CommitHash> {
    let name = revision.name();
    let candidates = match revision.kind() {
        RevisionKind::DefaultBranch => vec!["refs/remotes/origin/HEAD".to_string()],
        RevisionKind::Named => vec![
            format!("refs/remotes/origin/{name}"),
            format!("refs/tags/{name}"),
            format!("refs/heads/{name}"),
        ],
        RevisionKind::Commit => vec![
            format!("refs/remotes/origin/{name}"),
            format!("refs/tags/{name}"),
            format!("refs/heads/{name}"),
            name.to_string(),
        ],
    };

    for candidate in candidates {
        if let Some(hash) = peel(repo, &candidate).await {
            tracing::trace!(revision = name, reference = %candidate, hash = %hash, "Resolved revision");
            return Ok(hash);
        }
    }

    Err(PluginError::RevisionNotFound {
        revision: name.to_string(),
    })
}

async fn peel(repo: &Path, reference: &str) -> Option<CommitHash> {
    let spec = format!("{reference}^{{commit}}");
    let out = Git::new(["rev-parse", "--verify", "--quiet", spec.as_str()])
        .current_dir(repo)
        .output()
        .await
        .ok()?;
    CommitHash::parse(&out)
}

/// Detach the working tree at `hash`.
///
/// # Errors
///
/// Returns an error if git cannot check the commit out.
pub async fn checkout(repo: &Path, hash: &CommitHash) -> PluginResult<()> {
    Git::new(["checkout", "--quiet", "--detach", hash.as_str()])
        .current_dir(repo)
        .output()
        .await?;
    Ok(())
}

/// Clone `url` into `dest` and leave it at `revision`.
///
/// Named revisions are cloned with `--single-branch --branch`. The default
/// branch is whatever the remote checks out, with `origin/HEAD` recorded.
/// Commit ids need the full history and a detached checkout afterwards.
///
/// # Errors
///
/// Returns an error if the clone fails, exceeds `limit`, or the commit cannot
/// be resolved in the fresh clone.
pub async fn clone(
    url: &str,
    dest: &Path,
    revision: &RequiredRevision,
    limit: Duration,
) -> PluginResult<()> {
    let mut args: Vec<&OsStr> = vec!["clone".as_ref(), "--quiet".as_ref()];
    if revision.kind() == RevisionKind::Named {
        args.extend::<[&OsStr; 3]>([
            "--single-branch".as_ref(),
            "--branch".as_ref(),
            revision.name().as_ref(),
        ]);
    }
    args.extend::<[&OsStr; 3]>(["--".as_ref(), url.as_ref(), dest.as_os_str()]);
    Git::new(args).output_within(limit).await?;

    if revision.kind() == RevisionKind::Commit {
        let hash = resolve(dest, revision).await?;
        checkout(dest, &hash).await?;
    }
    Ok(())
}
