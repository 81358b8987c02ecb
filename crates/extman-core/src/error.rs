//! Error types for extman-core

use thiserror::Error;

/// Result type alias using extman-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for extman
#[derive(Error, Debug)]
pub enum Error {
    /// Local catalog absent and the origin could not supply one
    #[error("Extension catalog not found: {path}")]
    CatalogNotFound { path: String },

    /// Named extension absent from the catalog
    #[error("Could not find an extension named '{name}'")]
    ExtensionNotFound { name: String },

    /// Extension has no binary on disk for any catalogued release
    #[error("Extension '{name}' is not installed")]
    NotInstalled { name: String },

    /// Requested version absent from an extension's releases
    #[error("Extension '{name}' has no release '{version}'")]
    ReleaseNotFound { name: String, version: String },

    /// Release carries no artifact for the target platform
    #[error("Extension '{name}' {version} is not available for {platform}")]
    PlatformNotSupported {
        name: String,
        version: String,
        platform: String,
    },

    /// Bytes did not deserialize into the expected schema
    #[error("Failed to parse {context}: {message}")]
    Parse { context: String, message: String },

    /// Archive is missing required entries or carries an invalid fragment
    #[error("Malformed extension archive: {reason}")]
    MalformedArchive { reason: String },

    /// Archive contains an entry that is neither a file nor a directory
    #[error("Unrecognized entry type for '{name}': {entry_type}")]
    UnsupportedEntryType { name: String, entry_type: String },

    /// Digest of the payload does not match the recorded digest
    #[error("Integrity check failed for '{name}': expected {expected}, got {actual}")]
    Integrity {
        name: String,
        expected: String,
        actual: String,
    },

    /// Transport failure or unexpected HTTP status
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Credential could not be retrieved or was rejected
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Another writer holds the catalog
    #[error("Concurrent update of {path}: {message}")]
    Conflict { path: String, message: String },

    /// Invalid configuration value or file
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a catalog not found error
    pub fn catalog_not_found(path: impl Into<String>) -> Self {
        Self::CatalogNotFound { path: path.into() }
    }

    /// Create an extension not found error
    pub fn extension_not_found(name: impl Into<String>) -> Self {
        Self::ExtensionNotFound { name: name.into() }
    }

    /// Create a not installed error
    pub fn not_installed(name: impl Into<String>) -> Self {
        Self::NotInstalled { name: name.into() }
    }

    /// Create a release not found error
    pub fn release_not_found(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::ReleaseNotFound {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Create a platform not supported error
    pub fn platform_not_supported(
        name: impl Into<String>,
        version: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self::PlatformNotSupported {
            name: name.into(),
            version: version.into(),
            platform: platform.into(),
        }
    }

    /// Create a parse error
    pub fn parse(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed archive error
    pub fn malformed_archive(reason: impl Into<String>) -> Self {
        Self::MalformedArchive {
            reason: reason.into(),
        }
    }

    /// Create an unsupported entry type error
    pub fn unsupported_entry_type(name: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self::UnsupportedEntryType {
            name: name.into(),
            entry_type: entry_type.into(),
        }
    }

    /// Create an integrity error
    pub fn integrity(
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Integrity {
            name: name.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a network error
    pub fn network(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Conflict {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether the caller may reasonably retry the failed operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Conflict { .. })
    }

    /// Whether this error means the catalog or an extension is absent
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CatalogNotFound { .. } | Self::ExtensionNotFound { .. }
        )
    }
}
