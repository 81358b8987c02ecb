//! Catalog refresh command

use anyhow::{Context, Result};
use camino::Utf8Path;

use crate::cli::RefreshArgs;
use crate::output;
use crate::utils::manager;

pub fn run(_args: RefreshArgs, config_dir: Option<&Utf8Path>) -> Result<()> {
    let manager = manager(config_dir)?;

    let catalog = output::with_spinner("Refreshing extension catalog...", || {
        manager.refresh_catalog()
    })
    .context("Failed to refresh extension catalog")?;
    output::success(&format!(
        "Catalog updated: {} extension(s) at {}",
        catalog.len(),
        manager.config().catalog_path.display()
    ));
    Ok(())
}
