//! Bridge from `zpm_config::Config` to the library types.

use zpm_config::Config;
use zpm_plugins::GitOptions;
use zpm_telemetry::{LogConfig, LogFormat};

/// Convert the `[logging]` section to a [`LogConfig`].
///
/// Logs never go to stdout: the output of `zpm load` is sourced by the shell.
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg.logging.format.parse().unwrap_or(LogFormat::Compact);
    let log_config = LogConfig::new(&cfg.logging.level).with_format(format);

    match cfg.logging.directory() {
        Some(dir) => log_config.with_file_logging(dir),
        None => log_config,
    }
}

/// Convert the `[timeouts]` section to [`GitOptions`].
pub(crate) fn git_options(cfg: &Config) -> GitOptions {
    GitOptions {
        fetch_timeout: cfg.timeouts.git_fetch(),
        clone_timeout: cfg.timeouts.git_clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use zpm_telemetry::LogTarget;

    use super::*;

    #[test]
    fn logging_defaults_to_stderr() {
        let lc = to_log_config(&Config::default());
        assert_eq!(lc.level, "info");
        assert_eq!(lc.format, LogFormat::Compact);
        assert_eq!(lc.target, LogTarget::Stderr);
    }

    #[test]
    fn logging_directory_selects_files() {
        let mut cfg = Config::default();
        cfg.logging.level = "debug".into();
        cfg.logging.format = "json".into();
        cfg.logging.directory = "/var/log/zpm".into();

        let lc = to_log_config(&cfg);
        assert_eq!(lc.level, "debug");
        assert_eq!(lc.format, LogFormat::Json);
        assert_eq!(lc.target, LogTarget::File(PathBuf::from("/var/log/zpm")));
        assert!(!lc.ansi);
    }

    #[test]
    fn timeouts_become_git_options() {
        let mut cfg = Config::default();
        cfg.timeouts.git_fetch_secs = 5;
        let options = git_options(&cfg);
        assert_eq!(options.fetch_timeout, Duration::from_secs(5));
        assert_eq!(options.clone_timeout, Duration::from_secs(300));
    }
}
