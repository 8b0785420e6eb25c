//! Shared helpers for the plugin commands.

use anyhow::{Context, Result};
use zpm_config::Config;
use zpm_plugins::{PluginEntry, PluginState, PluginStorage};

use crate::config_bridge;
use crate::theme::Theme;

/// Resolve `specs` against the configured root and timeouts.
pub(super) fn open_storage<S: AsRef<str>>(config: &Config, specs: &[S]) -> Result<PluginStorage> {
    PluginStorage::new(&config.root_dir(), specs, config_bridge::git_options(config))
        .context("while reading plugin configurations")
}

/// Entries a pass is about to act on, with the state that selected them.
pub(super) fn planned(storage: &PluginStorage, include_updates: bool) -> Vec<(String, PluginState)> {
    storage
        .entries()
        .iter()
        .filter(|e| match e.state() {
            PluginState::NeedInstall => true,
            PluginState::NeedUpdate => include_updates,
            _ => false,
        })
        .map(|e| (e.name().to_owned(), e.state()))
        .collect()
}

/// Print what happened to each planned entry, then every failure.
pub(super) fn print_outcome(storage: &PluginStorage, planned: &[(String, PluginState)]) {
    for (name, before) in planned {
        if storage.get(name).map(PluginEntry::state) != Some(PluginState::Installed) {
            continue;
        }
        let verb = if *before == PluginState::NeedUpdate {
            "updated"
        } else {
            "installed"
        };
        println!("{}", Theme::success(&format!("{verb}: {name}")));
    }
    print_failures(storage);
}

/// Report every failed entry by name.
pub(super) fn print_failures(storage: &PluginStorage) {
    for entry in storage.failures() {
        let message = entry
            .error()
            .map_or_else(|| format!("{}: failed", entry.name()), ToString::to_string);
        eprintln!("{}", Theme::error(&message));
    }
}
