//! End-to-end acquisition flows
//!
//! `ExtensionManager` wires the pipeline stages together from one resolved
//! configuration:
//!
//! ```text
//! archive (file | url) -> ArchiveExtractor -> Installer::verify
//!                                          -> ManifestReconciler -> Installer::install
//! catalog release      -> artifact url     -> Installer::verify -> install -> installed index
//! ```
//!
//! Every stage runs sequentially on the calling thread.

use crate::extractor::{ArchiveExtractor, ExtractedArchive};
use crate::fetcher::RemoteCatalogFetcher;
use crate::http::HttpClient;
use crate::installer::{InstallResult, Installer};
use crate::reconciler::ManifestReconciler;
use crate::store::{CatalogLock, CatalogStore};
use extman_core::types::{CatalogDocument, Extension, Release, TargetPlatform};
use extman_core::utils::write_atomic;
use extman_core::{Error, ExtmanConfig, InstalledIndex, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Facade over the catalog, extraction and installation stages
pub struct ExtensionManager {
    config: ExtmanConfig,
    client: HttpClient,
    platform: TargetPlatform,
    store: CatalogStore,
    installed: InstalledIndex,
    extractor: ArchiveExtractor,
    installer: Installer,
}

impl ExtensionManager {
    /// Build every stage from `config`, targeting the host platform
    pub fn new(config: ExtmanConfig) -> Result<Self> {
        let client = HttpClient::new(&config.user_agent)?;
        let fetcher = RemoteCatalogFetcher::from_config(client.clone(), &config);
        let store = CatalogStore::new(config.catalog_path.clone()).with_bootstrap(Box::new(fetcher));

        Ok(Self {
            installed: InstalledIndex::new(config.config_file()),
            extractor: ArchiveExtractor::from_config(&config),
            installer: Installer::from_config(&config),
            platform: TargetPlatform::detect(),
            store,
            client,
            config,
        })
    }

    /// Install for `platform` instead of the host
    pub fn with_platform(mut self, platform: TargetPlatform) -> Self {
        self.platform = platform;
        self
    }

    pub fn config(&self) -> &ExtmanConfig {
        &self.config
    }

    pub fn platform(&self) -> &TargetPlatform {
        &self.platform
    }

    pub fn installed_index(&self) -> &InstalledIndex {
        &self.installed
    }

    /// Load the local catalog, downloading it on first use
    pub fn catalog(&self) -> Result<CatalogDocument> {
        self.store.load()
    }

    /// Look up one extension in the catalog
    pub fn lookup(&self, name: &str) -> Result<Extension> {
        self.store.find_by_name(name)
    }

    /// Re-download the remote catalog, replacing the local copy
    ///
    /// The body is validated before it is written; an invalid remote
    /// document leaves the local catalog untouched.
    pub fn refresh_catalog(&self) -> Result<CatalogDocument> {
        let fetcher = RemoteCatalogFetcher::from_config(self.client.clone(), &self.config);
        let body = fetcher.fetch()?;

        let content = String::from_utf8(body).map_err(|e| Error::parse("remote catalog", e))?;
        let document = CatalogDocument::from_toml_str(&content)?;

        let _lock = CatalogLock::acquire(self.store.path())?;
        write_atomic(self.store.path(), content.as_bytes())?;
        info!("Refreshed catalog with {} extensions", document.len());
        Ok(document)
    }

    /// Install from a local `.tar.gz` distribution archive
    pub fn install_from_file(&self, archive: &Path) -> Result<InstallResult> {
        let extracted = self.extractor.extract_file(archive)?;
        self.install_extracted(extracted)
    }

    /// Install from a `.tar.gz` distribution archive served over HTTP
    pub fn install_from_url(&self, url: &str) -> Result<InstallResult> {
        let extracted = self.extractor.extract_url(&self.client, url)?;
        self.install_extracted(extracted)
    }

    /// Install a catalogued release, the newest one when `version` is None
    ///
    /// The artifact for the target platform is downloaded from its `url`.
    pub fn install_from_catalog(&self, name: &str, version: Option<&str>) -> Result<InstallResult> {
        let extension = self.lookup(name)?;
        let release = select_release(&extension, version)?;

        let artifact = release.artifact_for(&self.platform).ok_or_else(|| {
            Error::platform_not_supported(name, &release.version, self.platform.to_string())
        })?;
        let url = artifact.url.as_deref().ok_or_else(|| {
            Error::parse(
                format!("catalog entry for {} {}", name, release.version),
                format!("no download url for {}", self.platform),
            )
        })?;

        info!("Downloading {} {} from {}", name, release.version, url);
        let bytes = self.client.get_bytes(url, None)?;

        let result = self.installer.install(name, &bytes, release, &self.platform)?;
        self.installed.add(name)?;
        Ok(result)
    }

    /// Names recorded in the installed index
    pub fn installed(&self) -> Result<Vec<String>> {
        self.installed.list()
    }

    /// Newest installed release of `name` and the path of its binary
    pub fn installed_binary(&self, name: &str) -> Result<(Release, PathBuf)> {
        let extension = self.lookup(name)?;
        self.installer
            .installed_release(&extension, &self.platform)
            .map(|(release, path)| (release.clone(), path))
            .ok_or_else(|| Error::not_installed(name))
    }

    fn install_extracted(&self, extracted: ExtractedArchive) -> Result<InstallResult> {
        let name = extracted.extension().name.clone();

        // Refuse to touch the catalog for a binary that would never install
        self.installer
            .verify(&name, extracted.binary(), extracted.release(), &self.platform)?;

        let (extension, binary) = extracted.into_parts();
        let release = &extension.releases[0];

        let outcome = ManifestReconciler::new(&self.store, &self.installed)
            .reconcile(&extension, release)?;
        debug!("Reconciled {}: {:?}", name, outcome);

        self.installer
            .install(&name, &binary, release, &self.platform)
    }
}

/// Requested release, or the most recently published one
pub fn select_release<'a>(extension: &'a Extension, version: Option<&str>) -> Result<&'a Release> {
    match version {
        Some(v) => extension
            .release(v)
            .ok_or_else(|| Error::release_not_found(&extension.name, v)),
        None => extension
            .latest_release()
            .ok_or_else(|| Error::release_not_found(&extension.name, "latest")),
    }
}
