//! Running the `git` binary.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{PluginError, PluginResult};

/// Variables passed through to git: executable lookup, SSH keys and agent,
/// and the proxies curl honours.
const INHERITED_ENV: &[&str] = &[
    "PATH",
    "HOME",
    "SSH_AUTH_SOCK",
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
    "NO_PROXY",
    "no_proxy",
];

/// A `git` invocation with an isolated environment.
///
/// The inherited environment is cleared so `GIT_DIR`, `GIT_PROXY_COMMAND` and
/// similar variables of the calling shell do not leak in, and the system and
/// global configuration files are ignored. Only [`INHERITED_ENV`] survives.
pub(crate) struct Git {
    args: Vec<OsString>,
    dir: Option<std::path::PathBuf>,
}

impl Git {
    pub(crate) fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self {
            args: args.into_iter().map(|a| a.as_ref().to_os_string()).collect(),
            dir: None,
        }
    }

    /// Run inside `dir` instead of the current directory.
    pub(crate) fn current_dir(mut self, dir: &Path) -> Self {
        self.dir = Some(dir.to_path_buf());
        self
    }

    fn subcommand(&self) -> String {
        self.args
            .first()
            .map(|a| a.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn command(&self) -> Command {
        self.command_with(|key| std::env::var_os(key))
    }

    /// Build the command, taking inherited variables from `lookup`.
    fn command_with(&self, lookup: impl Fn(&str) -> Option<OsString>) -> Command {
        let mut cmd = Command::new("git");
        cmd.env_clear();
        for &key in INHERITED_ENV {
            if let Some(value) = lookup(key) {
                cmd.env(key, value);
            }
        }
        cmd.env("GIT_CONFIG_NOSYSTEM", "1");
        cmd.env("GIT_CONFIG_GLOBAL", "/dev/null");
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.env("GIT_SSH_COMMAND", "ssh -o BatchMode=yes");
        cmd.stdin(std::process::Stdio::null());
        // A dropped future (timeout) must take the child with it.
        cmd.kill_on_drop(true);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        cmd.args(&self.args);
        cmd
    }

    /// Run to completion and return trimmed stdout.
    pub(crate) async fn output(self) -> PluginResult<String> {
        let command = self.subcommand();
        tracing::trace!(args = ?self.args, dir = ?self.dir, "Running git");

        let output = self
            .command()
            .output()
            .await
            .map_err(|e| PluginError::GitCommand {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(PluginError::GitCommand {
                command,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Like [`Git::output`], cancelled after `limit`.
    pub(crate) async fn output_within(self, limit: Duration) -> PluginResult<String> {
        let operation = format!("git {}", self.subcommand());
        tokio::time::timeout(limit, self.output())
            .await
            .map_err(|_| PluginError::Timeout {
                operation,
                secs: limit.as_secs(),
            })?
    }
}

/// Whether a `git` binary can be run at all.
#[cfg(test)]
pub(crate) async fn available() -> bool {
    Git::new(["--version"]).output().await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failing_command_reports_subcommand() {
        if !available().await {
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        let err = Git::new(["rev-parse", "--verify", "HEAD"])
            .current_dir(tmp.path())
            .output()
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::GitCommand { ref command, .. } if command == "rev-parse"));
    }

    #[test]
    fn environment_does_not_leak() {
        let parent = |key: &str| match key {
            "GIT_DIR" | "GIT_PROXY_COMMAND" | "PATH" | "SSH_AUTH_SOCK" | "HTTPS_PROXY"
            | "https_proxy" | "NO_PROXY" => Some(OsString::from(format!("{key}-value"))),
            _ => None,
        };
        let cmd = Git::new(["status"]).command_with(parent);
        let envs: Vec<_> = cmd.as_std().get_envs().collect();
        let value = |key: &str| {
            envs.iter()
                .find(|(k, _)| *k == key)
                .and_then(|(_, v)| *v)
                .map(|v| v.to_string_lossy().into_owned())
        };

        assert_eq!(value("GIT_TERMINAL_PROMPT").as_deref(), Some("0"));
        assert_eq!(value("GIT_DIR"), None);
        assert_eq!(value("GIT_PROXY_COMMAND"), None);
        for key in ["PATH", "SSH_AUTH_SOCK", "HTTPS_PROXY", "https_proxy", "NO_PROXY"] {
            assert_eq!(value(key), Some(format!("{key}-value")), "{key}");
        }
        // Unset variables are not invented.
        assert_eq!(value("HOME"), None);
        assert_eq!(value("no_proxy"), None);
    }
}
