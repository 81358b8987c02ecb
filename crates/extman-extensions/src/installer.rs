//! Checksum-gated installation of extension binaries
//!
//! Bytes coming out of an archive or a download are only ever written
//! after their digest has been compared against the release's recorded
//! digest for the target platform. Binaries land at
//! `<extensions_dir>/<name>/<version>/<name><exe suffix>`.

use crate::extractor::is_path_component;
use extman_core::types::{Digest, Extension, Release, TargetPlatform};
use extman_core::{Error, ExtmanConfig, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Outcome of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    pub name: String,
    pub version: String,
    pub binary_path: PathBuf,
    pub digest: Digest,
}

/// Writes verified binaries into the extensions directory
#[derive(Debug, Clone)]
pub struct Installer {
    extensions_dir: PathBuf,
}

impl Installer {
    pub fn new(extensions_dir: impl Into<PathBuf>) -> Self {
        Self {
            extensions_dir: extensions_dir.into(),
        }
    }

    pub fn from_config(config: &ExtmanConfig) -> Self {
        Self::new(config.extensions_dir.clone())
    }

    /// Root directory for installed binaries
    pub fn extensions_dir(&self) -> &Path {
        &self.extensions_dir
    }

    /// Location of the binary for one release on `platform`
    pub fn binary_path(
        &self,
        name: &str,
        version: &str,
        platform: &TargetPlatform,
    ) -> Result<PathBuf> {
        check_component("extension name", name)?;
        check_component("release version", version)?;
        Ok(self
            .extensions_dir
            .join(name)
            .join(version)
            .join(platform.executable_name(name)))
    }

    /// Check `bytes` against the digest recorded for `platform`
    ///
    /// Returns the verified digest.
    pub fn verify(
        &self,
        name: &str,
        bytes: &[u8],
        release: &Release,
        platform: &TargetPlatform,
    ) -> Result<Digest> {
        let artifact = release.artifact_for(platform).ok_or_else(|| {
            Error::platform_not_supported(name, &release.version, platform.to_string())
        })?;

        let expected = artifact.digest()?;
        let actual = expected.compute_like(bytes);
        if actual != expected {
            warn!(
                "Checksum mismatch for {} {}: expected {}, got {}",
                name, release.version, expected, actual
            );
            return Err(Error::integrity(
                name,
                expected.to_string(),
                actual.to_string(),
            ));
        }

        debug!("Verified {} {} ({})", name, release.version, actual);
        Ok(actual)
    }

    /// Verify and write the binary for `release`
    ///
    /// Nothing is written unless the digest matches. The binary is staged in
    /// the destination directory and renamed into place.
    pub fn install(
        &self,
        name: &str,
        bytes: &[u8],
        release: &Release,
        platform: &TargetPlatform,
    ) -> Result<InstallResult> {
        let binary_path = self.binary_path(name, &release.version, platform)?;
        let digest = self.verify(name, bytes, release, platform)?;

        let install_dir = binary_path
            .parent()
            .ok_or_else(|| Error::invalid_config("extensions directory has no parent"))?;
        fs::create_dir_all(install_dir)?;

        let mut staged = NamedTempFile::new_in(install_dir)?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = staged.as_file().metadata()?.permissions();
            perms.set_mode(0o755);
            fs::set_permissions(staged.path(), perms)?;
        }

        staged
            .persist(&binary_path)
            .map_err(|e| Error::Io(e.error))?;

        info!(
            "Installed {} {} to {}",
            name,
            release.version,
            binary_path.display()
        );

        Ok(InstallResult {
            name: name.to_string(),
            version: release.version.clone(),
            binary_path,
            digest,
        })
    }

    /// Newest catalogued release of `extension` with a binary on disk
    pub fn installed_release<'a>(
        &self,
        extension: &'a Extension,
        platform: &TargetPlatform,
    ) -> Option<(&'a Release, PathBuf)> {
        extension.releases.iter().rev().find_map(|release| {
            let path = self
                .binary_path(&extension.name, &release.version, platform)
                .ok()?;
            path.is_file().then_some((release, path))
        })
    }
}

fn check_component(what: &str, value: &str) -> Result<()> {
    if is_path_component(value) {
        Ok(())
    } else {
        Err(Error::parse(
            format!("{} '{}'", what, value),
            "not a valid path component",
        ))
    }
}
