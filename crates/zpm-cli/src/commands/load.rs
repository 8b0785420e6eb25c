//! `zpm load`: print the script that activates every plugin.
//!
//! Everything written to stdout is sourced by the shell, so diagnostics are
//! either shell comments or go to the log.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};
use zpm_config::Config;

use super::helpers::open_storage;
use crate::render::render;
use crate::state::{RootState, update_due};

pub(crate) async fn run_load(config: &Config, config_path: Option<&Path>, no_cache: bool) -> Result<()> {
    let state = RootState::new(config.root_dir());

    if config.on_load.check_for_updates
        && let Err(e) = schedule_check(config, &state, config_path)
    {
        warn!(error = %e, "Cannot start the background update check");
    }

    if !no_cache && let Some(cache) = state.cached_script() {
        println!("source {}", cache.display());
        return Ok(());
    }

    let mut storage = open_storage(config, &config.plugins)?;
    storage.check_updates(true).await;
    if config.on_load.install_missing && storage.has_installs() {
        storage.install_all().await;
    }

    let rendered = render(storage.load_scripts());
    for error in &rendered.errors {
        println!("# {error}");
    }
    let script = rendered.script();
    print!("{script}");

    if no_cache {
        return Ok(());
    }
    // A partial script would hide the failing plugins until the next install.
    if rendered.errors.is_empty() {
        state.write_cache(&script)?;
    } else {
        debug!(failed = rendered.errors.len(), "Not caching an incomplete script");
    }
    Ok(())
}

/// Start `zpm check` in the background if the last check is too old.
///
/// The check time is recorded before spawning so that shells started in
/// quick succession launch a single check.
fn schedule_check(config: &Config, state: &RootState, config_path: Option<&Path>) -> Result<()> {
    let period = config.on_load.update_check_period()?;
    let now = Utc::now();
    if !update_due(state.last_update()?, now, period) {
        return Ok(());
    }

    state.record_update(now)?;
    spawn_check(config_path)?;
    info!("Started a background update check");
    Ok(())
}

// The check outlives this process; nothing waits for it.
#[allow(clippy::zombie_processes)]
fn spawn_check(config_path: Option<&Path>) -> Result<()> {
    let exe = std::env::current_exe().context("cannot locate the zpm executable")?;
    let mut cmd = Command::new(exe);
    cmd.arg("check");
    if let Some(path) = config_path {
        cmd.arg("--config").arg(path);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("failed to spawn zpm check")?;
    Ok(())
}
