//! `zpm update`: install missing plugins and apply available updates.

use anyhow::Result;
use chrono::Utc;
use zpm_config::Config;

use super::helpers::{open_storage, planned, print_outcome};
use crate::state::RootState;
use crate::theme::Theme;

pub(crate) async fn run_update(config: &Config, plugin: Option<&str>, only_missing: bool) -> Result<()> {
    let state = RootState::new(config.root_dir());
    state.invalidate_cache()?;

    let specs = match plugin {
        Some(spec) => vec![spec.to_owned()],
        None => config.plugins.clone(),
    };
    let mut storage = open_storage(config, &specs)?;
    storage.check_updates(false).await;

    let planned = planned(&storage, !only_missing);
    storage.install_all().await;
    if !only_missing {
        storage.update_all().await;
    }

    if planned.is_empty() && storage.failures().next().is_none() {
        println!("{}", Theme::success("Nothing to update"));
    }
    print_outcome(&storage, &planned);

    state.record_update(Utc::now())?;
    Ok(())
}
