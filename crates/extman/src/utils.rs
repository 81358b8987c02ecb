//! Utility functions shared across CLI commands

use anyhow::{Context, Result};
use camino::Utf8Path;
use extman_core::{ExtmanConfig, HierarchicalConfigLoader};
use extman_extensions::ExtensionManager;

/// Load configuration, honouring a `--config-dir` override
pub fn load_config(config_dir: Option<&Utf8Path>) -> Result<ExtmanConfig> {
    let loader = match config_dir {
        Some(dir) => HierarchicalConfigLoader::with_dir(dir.as_std_path()),
        None => HierarchicalConfigLoader::new().context("Failed to locate config directory")?,
    };
    loader
        .load()
        .with_context(|| format!("Failed to load config from {}", loader.config_dir().display()))
}

/// Build the acquisition pipeline for the resolved configuration
pub fn manager(config_dir: Option<&Utf8Path>) -> Result<ExtensionManager> {
    let config = load_config(config_dir)?;
    ExtensionManager::new(config).context("Failed to initialise extension manager")
}
