//! # extman-extensions
//!
//! Extension acquisition pipeline for extman:
//! - Catalog store with bootstrap, locked updates and atomic writes
//! - Remote catalog fetcher and distribution URL resolution
//! - Streaming archive extraction with strict entry-type checks
//! - Manifest reconciliation into the local catalog
//! - Checksum-gated installation
//! - Process-scoped lifecycle for running extensions

pub mod extractor;
pub mod fetcher;
pub mod http;
pub mod installer;
pub mod lifecycle;
pub mod pipeline;
pub mod reconciler;
pub mod store;

pub use extractor::{ArchiveExtractor, ExtractedArchive};
pub use fetcher::{DistributionResolver, HttpDistributionResolver, RemoteCatalogFetcher};
pub use http::HttpClient;
pub use installer::{InstallResult, Installer};
pub use lifecycle::{ClientLifecycle, ExtensionRuntime, LifecycleGuard, ProcessRuntime, RuntimeId};
pub use pipeline::{select_release, ExtensionManager};
pub use reconciler::{ManifestReconciler, ReconcileOutcome};
pub use store::{CatalogBootstrap, CatalogLock, CatalogStore};
