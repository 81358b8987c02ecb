//! # extman-core
//!
//! Core library for extman providing:
//! - Extension catalog types (catalog, extensions, releases, artifacts)
//! - Integrity digests and target platform detection
//! - Hierarchical configuration loading
//! - The installed-extensions index

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::{ExtmanConfig, HierarchicalConfigLoader, InstalledIndex};
pub use error::{Error, Result};
pub use utils::get_home_dir;
