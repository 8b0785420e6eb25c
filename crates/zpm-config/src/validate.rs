//! Configuration defaulting and validation.

use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, DEFAULT_ROOT};

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Fill in defaults that depend on `home` and reject invalid values.
///
/// After this returns `Ok`, `root` is an absolute path, the log level and
/// format are lowercase, and the update check period parses.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &mut Config, home: &Path) -> ConfigResult<()> {
    apply_defaults(config, home);
    validate_plugins(config)?;
    validate_logging(config)?;
    validate_on_load(config)?;
    validate_timeouts(config)?;
    Ok(())
}

fn apply_defaults(config: &mut Config, home: &Path) {
    config.root = if config.root.is_empty() {
        home.join(DEFAULT_ROOT).display().to_string()
    } else {
        expand_home(&config.root, home)
    };

    if !config.logging.directory.is_empty() {
        config.logging.directory = expand_home(&config.logging.directory, home);
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    config.logging.level = if level.is_empty() {
        "info".to_owned()
    } else {
        level
    };
    config.logging.format = config.logging.format.trim().to_ascii_lowercase();
}

fn expand_home(path: &str, home: &Path) -> String {
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest).display().to_string(),
        None if path == "~" => home.display().to_string(),
        None => path.to_owned(),
    }
}

fn validate_plugins(config: &Config) -> ConfigResult<()> {
    if let Some(idx) = config.plugins.iter().position(|p| p.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: format!("plugins[{idx}]"),
            message: "plugin spec must not be empty".to_owned(),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    if !VALID_LEVELS.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                VALID_LEVELS.join(", ")
            ),
        });
    }

    if !VALID_FORMATS.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                VALID_FORMATS.join(", ")
            ),
        });
    }
    Ok(())
}

fn validate_on_load(config: &Config) -> ConfigResult<()> {
    config
        .on_load
        .update_check_period()
        .map_err(|e| ConfigError::ValidationError {
            field: "on_load.update_check_period".to_owned(),
            message: format!("'{}': {e}", config.on_load.update_check_period),
        })?;
    Ok(())
}

fn validate_timeouts(config: &Config) -> ConfigResult<()> {
    let t = &config.timeouts;

    if t.git_fetch_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "timeouts.git_fetch_secs".to_owned(),
            message: "git_fetch_secs must be greater than 0".to_owned(),
        });
    }

    if t.git_clone_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "timeouts.git_clone_secs".to_owned(),
            message: "git_clone_secs must be greater than 0".to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fills_defaults() {
        let mut config = Config::default();
        config.logging.level = String::new();
        validate(&mut config, Path::new("/home/u")).unwrap();
        assert_eq!(config.root, "/home/u/.zpm_plugins");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn expands_home_and_normalises_case() {
        let mut config = Config {
            root: "~/zsh/plugins".into(),
            ..Config::default()
        };
        config.logging.level = "DEBUG".into();
        config.logging.format = "Json".into();
        config.logging.directory = "~/logs".into();

        validate(&mut config, Path::new("/home/u")).unwrap();
        assert_eq!(config.root, "/home/u/zsh/plugins");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.directory().unwrap(), Path::new("/home/u/logs"));
    }

    #[test]
    fn rejects_bad_values() {
        let home = Path::new("/home/u");

        let mut config = Config::default();
        config.logging.level = "verbose".into();
        assert_eq!(field(validate(&mut config, home).unwrap_err()), "logging.level");

        let mut config = Config::default();
        config.on_load.update_check_period = "soon".into();
        assert_eq!(
            field(validate(&mut config, home).unwrap_err()),
            "on_load.update_check_period"
        );

        let mut config = Config::default();
        config.timeouts.git_clone_secs = 0;
        assert_eq!(
            field(validate(&mut config, home).unwrap_err()),
            "timeouts.git_clone_secs"
        );

        let mut config = Config {
            plugins: vec!["dir:a".into(), " ".into()],
            ..Config::default()
        };
        assert_eq!(field(validate(&mut config, home).unwrap_err()), "plugins[1]");
    }
}
