//! Local catalog storage (plugins.toml)
//!
//! The store is the source of truth for name lookups. Reads bootstrap the
//! document from the remote origin when it is missing; writes replace the
//! whole document with an atomic rename; read-modify-write cycles run under
//! an exclusive lock on a sidecar `<catalog>.lock` file so that concurrent
//! processes serialise instead of losing updates.

use extman_core::types::{CatalogDocument, Extension};
use extman_core::utils::{parent_dir, write_atomic};
use extman_core::{Error, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Something that can materialise a catalog document at a path
pub trait CatalogBootstrap {
    /// Write a catalog document to `destination`
    fn bootstrap(&self, destination: &Path) -> Result<()>;
}

/// Local catalog document store
pub struct CatalogStore {
    path: PathBuf,
    bootstrap: Option<Box<dyn CatalogBootstrap>>,
}

impl CatalogStore {
    /// Create a store without a remote fallback
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bootstrap: None,
        }
    }

    /// Fetch the catalog from `source` the first time it is found missing
    pub fn with_bootstrap(mut self, source: Box<dyn CatalogBootstrap>) -> Self {
        self.bootstrap = Some(source);
        self
    }

    /// Path of the catalog document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the catalog document exists locally
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the catalog, bootstrapping it from the origin when absent
    ///
    /// The read is retried once after a bootstrap. Fetch failures are
    /// returned as-is; a bootstrap that leaves nothing on disk, or no
    /// bootstrap source at all, yields `CatalogNotFound`.
    pub fn load(&self) -> Result<CatalogDocument> {
        match self.read()? {
            Some(document) => Ok(document),
            None => {
                let source = self
                    .bootstrap
                    .as_ref()
                    .ok_or_else(|| Error::catalog_not_found(self.path.display().to_string()))?;

                debug!("Catalog {:?} does not exist, downloading", self.path);
                source.bootstrap(&self.path)?;

                self.read()?
                    .ok_or_else(|| Error::catalog_not_found(self.path.display().to_string()))
            }
        }
    }

    /// Load the catalog, treating a missing document as empty
    pub fn load_or_empty(&self) -> Result<CatalogDocument> {
        Ok(self.read()?.unwrap_or_default())
    }

    /// Load the catalog and look up one extension
    pub fn find_by_name(&self, name: &str) -> Result<Extension> {
        self.load()?.find_by_name(name).cloned()
    }

    /// Serialize and atomically replace the catalog document
    pub fn save(&self, document: &CatalogDocument) -> Result<()> {
        document.validate()?;
        let content = document.to_toml_string()?;
        write_atomic(&self.path, content.as_bytes())?;
        debug!(
            "Saved catalog with {} extensions to {:?}",
            document.len(),
            self.path
        );
        Ok(())
    }

    /// Load, modify, and save the catalog while holding the catalog lock
    ///
    /// A missing catalog is modified as an empty document. Nothing is
    /// written when `modify` fails.
    pub fn update<T, F>(&self, modify: F) -> Result<T>
    where
        F: FnOnce(&mut CatalogDocument) -> Result<T>,
    {
        let _lock = CatalogLock::acquire(&self.path)?;

        let mut document = self.load_or_empty()?;
        let outcome = modify(&mut document)?;
        self.save(&document)?;

        Ok(outcome)
    }

    fn read(&self) -> Result<Option<CatalogDocument>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let document = CatalogDocument::from_toml_str(&content).map_err(|e| match e {
                    Error::Parse { message, .. } => {
                        Error::parse(self.path.display().to_string(), message)
                    }
                    other => other,
                })?;
                debug!(
                    "Loaded catalog with {} extensions from {:?}",
                    document.len(),
                    self.path
                );
                Ok(Some(document))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Exclusive advisory lock held across a catalog read-modify-write
///
/// Released when dropped.
pub struct CatalogLock {
    _file: File,
    path: PathBuf,
}

impl CatalogLock {
    /// Block until the lock for `catalog_path` is held
    pub fn acquire(catalog_path: &Path) -> Result<Self> {
        let path = lock_path(catalog_path);
        std::fs::create_dir_all(parent_dir(&path))?;

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        file.lock_exclusive()
            .map_err(|e| Error::conflict(catalog_path.display().to_string(), e))?;

        debug!("Acquired catalog lock {:?}", path);
        Ok(Self { _file: file, path })
    }

    /// Path of the sidecar lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CatalogLock {
    fn drop(&mut self) {
        debug!("Released catalog lock {:?}", self.path);
    }
}

fn lock_path(catalog_path: &Path) -> PathBuf {
    let mut name = catalog_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "catalog".into());
    name.push(".lock");
    parent_dir(catalog_path).join(name)
}
