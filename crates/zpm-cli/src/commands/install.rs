//! `zpm install`: install missing plugins without checking for updates.

use anyhow::Result;
use zpm_config::Config;

use super::helpers::{open_storage, planned, print_outcome};
use crate::state::RootState;
use crate::theme::Theme;

pub(crate) async fn run_install(config: &Config) -> Result<()> {
    RootState::new(config.root_dir()).invalidate_cache()?;

    let mut storage = open_storage(config, &config.plugins)?;
    storage.check_installs();

    let planned = planned(&storage, false);
    if planned.is_empty() && storage.failures().next().is_none() {
        println!("{}", Theme::success("All plugins are installed"));
        return Ok(());
    }

    storage.install_all().await;
    print_outcome(&storage, &planned);
    Ok(())
}
