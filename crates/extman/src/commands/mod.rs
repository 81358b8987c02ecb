//! Command implementations
//!
//! - list: Tabular view of the catalog with installed markers
//! - info: Releases and artifacts of one extension
//! - refresh: Re-download the remote catalog
//! - install: Install from the catalog, a local archive, or an archive URL
//! - exec: Run an installed extension under the client lifecycle

pub mod exec;
pub mod info;
pub mod install;
pub mod list;
pub mod refresh;
