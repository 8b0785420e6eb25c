//! `zpm list`: show plugins in load order with their local state.

use anyhow::Result;
use zpm_config::Config;

use super::helpers::{open_storage, print_failures};
use crate::theme::Theme;

pub(crate) fn list_plugins(config: &Config) -> Result<()> {
    let mut storage = open_storage(config, &config.plugins)?;
    if storage.entries().is_empty() {
        println!("{}", Theme::info("No plugins configured"));
        return Ok(());
    }
    storage.check_installs();

    println!("{}", Theme::header("Plugins (load order)"));
    println!("  {:<48} {:<10} STATE", "SPEC", "TYPE");
    println!("{}", Theme::separator());
    for entry in storage.entries() {
        println!(
            "  {:<48} {:<10} {}",
            entry.name(),
            entry.plugin().kind(),
            Theme::state(entry.state())
        );
    }
    println!(
        "\n{}",
        Theme::dimmed(&format!("{} plugin(s)", storage.entries().len()))
    );
    print_failures(&storage);
    Ok(())
}
