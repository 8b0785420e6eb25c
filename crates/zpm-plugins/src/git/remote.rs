//! Git remotes: the GitHub shorthand and plain URLs, and where each one is
//! cloned under the plugin root.

use std::path::PathBuf;

use super::validate::{validate_git_ref, validate_github_component, validate_url_scheme};
use crate::error::PluginResult;

/// Where a git plugin is cloned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitRemote {
    /// GitHub shorthand: `github:account/repo`.
    GitHub {
        /// GitHub user or organization.
        account: String,
        /// Repository name.
        repo: String,
    },
    /// Any URL git understands.
    Url(String),
}

impl GitRemote {
    /// Build a validated GitHub remote.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is not a valid GitHub name.
    pub fn github(account: &str, repo: &str) -> PluginResult<Self> {
        validate_github_component(account, "account")?;
        validate_github_component(repo, "repo")?;
        Ok(Self::GitHub {
            account: account.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Parse `<url>[@<revision>]` as accepted by the `git:` spec.
    ///
    /// # Errors
    ///
    /// Returns an error unless the URL is `https://` or `ssh://`, or if the
    /// revision is not a valid git ref.
    pub fn parse_url(source: &str) -> PluginResult<(Self, Option<String>)> {
        let (url, revision) = split_ref(source);
        validate_url_scheme(&url)?;
        if let Some(ref r) = revision {
            validate_git_ref(r)?;
        }
        Ok((Self::Url(url), revision))
    }

    /// Whether this is a GitHub shorthand remote.
    #[must_use]
    pub fn is_github(&self) -> bool {
        matches!(self, Self::GitHub { .. })
    }

    /// The URL passed to `git clone`.
    #[must_use]
    pub fn url(&self) -> String {
        match self {
            Self::GitHub { account, repo } => format!("https://github.com/{account}/{repo}"),
            Self::Url(url) => url.clone(),
        }
    }

    /// Location of the clone relative to the plugin root: `<host>/<path>`
    /// with any credentials, port and `.git` suffix dropped.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Self::GitHub { account, repo } => ["github.com", account.as_str(), repo.as_str()]
                .into_iter()
                .collect(),
            Self::Url(url) => {
                let rest = url.split_once("://").map_or(url.as_str(), |(_, rest)| rest);
                let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
                let host = authority.rsplit('@').next().unwrap_or(authority);
                let host = host.split(':').next().unwrap_or(host);

                let path = path.trim_end_matches('/');
                let path = path.strip_suffix(".git").unwrap_or(path);

                std::iter::once(host)
                    .chain(path.split('/'))
                    .filter(|part| !part.is_empty() && *part != "." && *part != "..")
                    .collect()
            },
        }
    }
}

impl std::fmt::Display for GitRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url())
    }
}

/// Split a git repository URL from an optional `@ref` suffix.
///
/// An `@` in the authority (`ssh://git@host/...`) is not a separator; only
/// the last `@` in the path portion is.
#[must_use]
pub fn split_ref(s: &str) -> (String, Option<String>) {
    if let Some((scheme, after_scheme)) = s.split_once("://") {
        let (authority, path) = match after_scheme.find('/') {
            Some(idx) => after_scheme.split_at(idx),
            None => (after_scheme, ""),
        };
        if let Some((path, git_ref)) = path.rsplit_once('@')
            && !git_ref.is_empty()
        {
            return (format!("{scheme}://{authority}{path}"), Some(git_ref.to_string()));
        }
        return (s.to_string(), None);
    }

    match s.split_once('@') {
        Some((value, git_ref)) if !git_ref.is_empty() => {
            (value.to_string(), Some(git_ref.to_string()))
        },
        _ => (s.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn split_ref_variants() {
        assert_eq!(
            split_ref("https://gitlab.com/org/repo.git@main"),
            ("https://gitlab.com/org/repo.git".into(), Some("main".into()))
        );
        assert_eq!(
            split_ref("ssh://git@github.com/org/repo.git"),
            ("ssh://git@github.com/org/repo.git".into(), None)
        );
        assert_eq!(
            split_ref("ssh://git@github.com/org/repo.git@v1.0"),
            ("ssh://git@github.com/org/repo.git".into(), Some("v1.0".into()))
        );
        assert_eq!(
            split_ref("https://host/repo@"),
            ("https://host/repo@".into(), None)
        );
    }

    #[test]
    fn parse_url_rejects_local_schemes() {
        assert!(GitRemote::parse_url("file:///tmp/repo").is_err());
        assert!(GitRemote::parse_url("/tmp/repo").is_err());
        assert!(GitRemote::parse_url("https://host/repo.git@--upload-pack=x").is_err());

        let (remote, rev) = GitRemote::parse_url("https://host/org/repo.git@dev").unwrap();
        assert_eq!(remote, GitRemote::Url("https://host/org/repo.git".into()));
        assert_eq!(rev.as_deref(), Some("dev"));
    }

    #[test]
    fn relative_paths() {
        let gh = GitRemote::github("zsh-users", "zsh-autosuggestions").unwrap();
        assert_eq!(
            gh.relative_path(),
            Path::new("github.com/zsh-users/zsh-autosuggestions")
        );
        assert_eq!(gh.url(), "https://github.com/zsh-users/zsh-autosuggestions");

        let url = GitRemote::Url("ssh://git@gitlab.com:2222/org/../repo.git/".into());
        assert_eq!(url.relative_path(), Path::new("gitlab.com/org/repo"));
        assert!(!url.is_github());
    }
}
