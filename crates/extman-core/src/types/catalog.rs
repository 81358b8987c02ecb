//! Extension catalog types (plugins.toml)
//!
//! The catalog is an ordered list of extensions, each carrying the releases
//! published for it in publication order (most recent last):
//! ```toml
//! [[extension]]
//! name = "hello"
//!
//! [[extension.release]]
//! version = "1.0.0"
//!
//! [[extension.release.artifact]]
//! os = "linux"
//! arch = "x86_64"
//! sum = "sha256:..."
//! ```
//! The same schema is used for the single-extension fragment shipped inside
//! distribution archives. Unknown keys are rejected, so a document written
//! in another schema fails to parse instead of loading as an empty catalog.

use crate::error::{Error, Result};
use crate::types::{Digest, TargetPlatform};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Full catalog document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDocument {
    /// Known extensions, names unique
    #[serde(rename = "extension", default)]
    pub extensions: Vec<Extension>,
}

/// One named, independently installable extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Extension {
    /// Stable identifier
    pub name: String,

    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Published binary name, informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,

    /// Releases in publication order
    #[serde(rename = "release", default)]
    pub releases: Vec<Release>,
}

/// One published version of an extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Release {
    /// Version string as published
    pub version: String,

    /// Per-platform artifacts
    #[serde(rename = "artifact", default)]
    pub artifacts: Vec<Artifact>,
}

/// Platform-specific build of a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Artifact {
    pub os: String,
    pub arch: String,

    /// Expected checksum, `sha256:<hex>` or bare hex
    pub sum: String,

    /// Download location when the artifact is served remotely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CatalogDocument {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a catalog document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let document: Self =
            toml::from_str(content).map_err(|e| Error::parse("extension catalog", e))?;
        document.validate()?;
        Ok(document)
    }

    /// Serialize the whole document
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::parse("extension catalog", e))
    }

    /// Reject documents that list the same extension name twice
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for extension in &self.extensions {
            if extension.name.trim().is_empty() {
                return Err(Error::parse(
                    "extension catalog",
                    "extension with an empty name",
                ));
            }
            if !seen.insert(extension.name.as_str()) {
                return Err(Error::parse(
                    "extension catalog",
                    format!("duplicate extension '{}'", extension.name),
                ));
            }
        }
        Ok(())
    }

    /// Look up an extension by name
    pub fn find_by_name(&self, name: &str) -> Result<&Extension> {
        self.extensions
            .iter()
            .find(|ext| ext.name == name)
            .ok_or_else(|| Error::extension_not_found(name))
    }

    /// Whether an extension with this name is present
    pub fn contains(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext.name == name)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Extension {
    /// Create an extension with the given releases
    pub fn new(name: impl Into<String>, releases: Vec<Release>) -> Self {
        Self {
            name: name.into(),
            description: None,
            binary: None,
            releases,
        }
    }

    /// Most recently published release
    pub fn latest_release(&self) -> Option<&Release> {
        self.releases.last()
    }

    /// Release for `version`; the most recently appended entry wins on duplicates
    pub fn release(&self, version: &str) -> Option<&Release> {
        self.releases.iter().rev().find(|r| r.version == version)
    }
}

impl Release {
    /// Create a release with the given artifacts
    pub fn new(version: impl Into<String>, artifacts: Vec<Artifact>) -> Self {
        Self {
            version: version.into(),
            artifacts,
        }
    }

    /// Artifact built for `platform`
    pub fn artifact_for(&self, platform: &TargetPlatform) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|a| platform.matches(&a.os, &a.arch))
    }
}

impl Artifact {
    /// Create an artifact without download coordinates
    pub fn new(os: impl Into<String>, arch: impl Into<String>, sum: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            sum: sum.into(),
            url: None,
        }
    }

    /// Attach a download URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Parsed expected digest
    pub fn digest(&self) -> Result<Digest> {
        self.sum.parse()
    }
}
