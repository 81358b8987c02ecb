//! Configuration loading and the installed-extensions index

mod installed;
mod loader;

pub use installed::{InstalledIndex, INSTALLED_FIELD};
pub use loader::{ConfigLayer, ExtmanConfig, HierarchicalConfigLoader, CONFIG_FILENAME};
