//! Merging extracted catalog fragments into the local catalog

use crate::store::CatalogStore;
use extman_core::types::{Extension, Release};
use extman_core::{InstalledIndex, Result};
use tracing::{debug, info};

/// How a fragment was merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The extension existed; the release was appended to it
    AppendedRelease,
    /// The extension was new and was added with its release
    AddedExtension,
}

/// Appends newly seen releases to the catalog and records installs
pub struct ManifestReconciler<'a> {
    store: &'a CatalogStore,
    installed: &'a InstalledIndex,
}

impl<'a> ManifestReconciler<'a> {
    pub fn new(store: &'a CatalogStore, installed: &'a InstalledIndex) -> Self {
        Self { store, installed }
    }

    /// Merge `release` of `extension` into the catalog
    ///
    /// Existing releases are never modified or deduplicated: reconciling
    /// the same version twice records it twice. A missing catalog is
    /// treated as empty. The extension name is added to the installed
    /// index once the catalog has been written.
    pub fn reconcile(&self, extension: &Extension, release: &Release) -> Result<ReconcileOutcome> {
        let outcome = self.store.update(|catalog| {
            match catalog
                .extensions
                .iter_mut()
                .find(|e| e.name == extension.name)
            {
                Some(existing) => {
                    debug!(
                        "Appending release {} to {} ({} existing)",
                        release.version,
                        existing.name,
                        existing.releases.len()
                    );
                    existing.releases.push(release.clone());
                    Ok(ReconcileOutcome::AppendedRelease)
                }
                None => {
                    debug!("Adding new extension {}", extension.name);
                    let mut added = extension.clone();
                    added.releases = vec![release.clone()];
                    catalog.extensions.push(added);
                    Ok(ReconcileOutcome::AddedExtension)
                }
            }
        })?;

        if self.installed.add(&extension.name)? {
            debug!("Recorded {} as installed", extension.name);
        }

        info!(
            "Reconciled {} {} into {}",
            extension.name,
            release.version,
            self.store.path().display()
        );
        Ok(outcome)
    }
}
