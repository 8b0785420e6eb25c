//! `zpm check`: look for updates without applying them.

use anyhow::Result;
use chrono::Utc;
use zpm_config::Config;
use zpm_plugins::PluginState;

use super::helpers::{open_storage, print_failures};
use crate::state::RootState;
use crate::theme::Theme;

pub(crate) async fn run_check(config: &Config) -> Result<()> {
    let mut storage = open_storage(config, &config.plugins)?;
    storage.check_updates(false).await;

    for entry in storage.entries() {
        match entry.state() {
            PluginState::NeedUpdate => {
                let message = entry.pending_update().unwrap_or("update available");
                println!("{}", Theme::info(message));
            },
            PluginState::NeedInstall => {
                println!("{}", Theme::warning(&format!("not installed: {}", entry.name())));
            },
            _ => {},
        }
    }
    print_failures(&storage);

    if !storage.has_updates() && !storage.has_installs() && storage.failures().next().is_none() {
        println!("{}", Theme::success("All plugins are up to date"));
    }

    RootState::new(config.root_dir()).record_update(Utc::now())?;
    Ok(())
}
