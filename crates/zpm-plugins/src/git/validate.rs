//! Validation of the pieces of a git spec that end up on a git command line.

use crate::error::{PluginError, PluginResult};

fn invalid(value: &str, reason: String) -> PluginError {
    PluginError::InvalidSpec {
        spec: value.to_string(),
        reason,
    }
}

/// Validate that a URL uses an allowed scheme.
///
/// # Errors
///
/// Returns an error unless the URL starts with `https://` or `ssh://`.
pub fn validate_url_scheme(url: &str) -> PluginResult<()> {
    let allowed = ["https://", "ssh://"];
    if allowed.iter().any(|scheme| url.starts_with(scheme)) {
        return Ok(());
    }
    Err(invalid(
        url,
        "blocked URL scheme, only https:// and ssh:// are allowed".into(),
    ))
}

/// Validate a GitHub account or repository name.
///
/// # Errors
///
/// Returns an error if the component is empty, too long, or contains
/// characters GitHub does not allow.
pub fn validate_github_component(value: &str, label: &str) -> PluginResult<()> {
    if value.is_empty() || value.len() > 100 {
        return Err(invalid(
            value,
            format!("GitHub {label} must be 1-100 characters, got {}", value.len()),
        ));
    }
    let is_valid = value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    if !is_valid {
        return Err(invalid(value, format!("GitHub {label} contains invalid characters")));
    }
    if value.starts_with('.') || value.starts_with('-') || value.ends_with('.') || value.contains("..")
    {
        return Err(invalid(value, format!("GitHub {label} has invalid format")));
    }
    Ok(())
}

/// Validate a git ref (branch, tag, or commit).
///
/// # Errors
///
/// Returns an error if the ref is empty, too long, or violates git ref naming
/// rules.
pub fn validate_git_ref(git_ref: &str) -> PluginResult<()> {
    if git_ref.is_empty() || git_ref.len() > 256 {
        return Err(invalid(git_ref, "git ref must be 1-256 characters".into()));
    }
    if git_ref.contains("..") {
        return Err(invalid(git_ref, "git ref contains '..'".into()));
    }
    if git_ref.starts_with('-') {
        return Err(invalid(git_ref, "git ref must not start with '-'".into()));
    }
    let is_valid = git_ref
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'/'));
    if !is_valid {
        return Err(invalid(git_ref, "git ref contains invalid characters".into()));
    }
    if git_ref.starts_with('.')
        || git_ref.ends_with('.')
        || git_ref.starts_with('/')
        || git_ref.ends_with('/')
        || std::path::Path::new(git_ref)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("lock"))
        || git_ref.contains("//")
    {
        return Err(invalid(git_ref, "git ref has invalid format".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_scheme() {
        assert!(validate_url_scheme("https://github.com/org/repo").is_ok());
        assert!(validate_url_scheme("ssh://git@github.com/org/repo").is_ok());
        assert!(validate_url_scheme("file:///etc/passwd").is_err());
        assert!(validate_url_scheme("http://example.com/repo.git").is_err());
    }

    #[test]
    fn github_component() {
        assert!(validate_github_component("zsh-users", "user").is_ok());
        assert!(validate_github_component("", "user").is_err());
        assert!(validate_github_component("-flag", "repo").is_err());
        assert!(validate_github_component("a..b", "repo").is_err());
    }

    #[test]
    fn git_refs() {
        for ok in ["master", "v0.3.9", "feature/thing", "0123abcd"] {
            assert!(validate_git_ref(ok).is_ok(), "{ok}");
        }
        for bad in ["", "--upload-pack=x", "a..b", "x.lock", "a//b", "/a", "a b", "a;b"] {
            assert!(validate_git_ref(bad).is_err(), "{bad}");
        }
    }
}
