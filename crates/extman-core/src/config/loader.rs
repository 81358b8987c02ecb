//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. User config (<config_dir>/config.yaml)
//! 3. Environment variables (EXTMAN_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::utils::get_home_dir;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the user config file inside the config directory
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Directory (under the config dir) that holds installed binaries by default
const DEFAULT_EXTENSIONS_DIRNAME: &str = "plugins";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// One configuration layer as written on disk; unset keys fall through
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigLayer {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub extensions_dir: Option<PathBuf>,
    #[serde(default)]
    pub binary_prefix: Option<String>,
    #[serde(default)]
    pub fragment_filename: Option<String>,
    #[serde(default)]
    pub catalog_filename: Option<String>,
    #[serde(default)]
    pub distribution_endpoint: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ConfigLayer {
    /// Values set in `overlay` replace those in `self`
    fn merge(self, overlay: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            api_base_url: overlay.api_base_url.or(self.api_base_url),
            api_key: overlay.api_key.or(self.api_key),
            catalog_path: overlay.catalog_path.or(self.catalog_path),
            extensions_dir: overlay.extensions_dir.or(self.extensions_dir),
            binary_prefix: overlay.binary_prefix.or(self.binary_prefix),
            fragment_filename: overlay.fragment_filename.or(self.fragment_filename),
            catalog_filename: overlay.catalog_filename.or(self.catalog_filename),
            distribution_endpoint: overlay.distribution_endpoint.or(self.distribution_endpoint),
            user_agent: overlay.user_agent.or(self.user_agent),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct ExtmanConfig {
    /// Directory holding config.yaml and, by default, the catalog
    pub config_dir: PathBuf,

    /// API origin used to resolve the distribution base URL
    pub api_base_url: String,

    /// Credential presented to the API origin
    pub api_key: Option<String>,

    /// Local catalog document
    pub catalog_path: PathBuf,

    /// Root directory for installed extension binaries
    pub extensions_dir: PathBuf,

    /// Token identifying the binary payload inside archives
    pub binary_prefix: String,

    /// Exact name of the catalog fragment inside archives
    pub fragment_filename: String,

    /// Well-known catalog file name at the distribution base URL
    pub catalog_filename: String,

    /// Endpoint (relative to the API origin) returning the distribution base URL
    pub distribution_endpoint: String,

    /// User agent sent with every request
    pub user_agent: String,
}

impl ExtmanConfig {
    /// Path of the user config file
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILENAME)
    }

    /// Credential, or an auth error when none is configured
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Error::auth(
                "no API key configured; set EXTMAN_API_KEY or api_key in config.yaml",
            )),
        }
    }
}

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader for the standard config directory
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Directory this loader reads from
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Resolve the config directory: EXTMAN_HOME, $XDG_CONFIG_HOME/extman, ~/.extman
    fn get_config_dir() -> Result<PathBuf> {
        if let Some(dir) = non_empty_env("EXTMAN_HOME") {
            return Ok(PathBuf::from(dir));
        }
        if let Some(xdg) = non_empty_env("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg).join("extman"));
        }
        Ok(get_home_dir()?.join(".extman"))
    }

    /// Load configuration with hierarchical precedence
    pub fn load(&self) -> Result<ExtmanConfig> {
        let mut layer = Self::load_embedded_defaults()?;

        let config_path = self.config_dir.join(CONFIG_FILENAME);
        if config_path.exists() {
            debug!("Loading user config from {:?}", config_path);
            layer = layer.merge(Self::load_yaml_file(&config_path)?);
        }

        layer = layer.merge(Self::env_layer());

        self.resolve(layer)
    }

    fn load_embedded_defaults() -> Result<ConfigLayer> {
        let embedded = EmbeddedConfigs::get("defaults.yaml")
            .ok_or_else(|| Error::invalid_config("Embedded config not found: defaults.yaml"))?;

        let content = std::str::from_utf8(&embedded.data)
            .map_err(|_| Error::invalid_config("Invalid UTF-8 in embedded defaults.yaml"))?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!("Failed to parse embedded defaults.yaml: {}", e))
        })
    }

    fn load_yaml_file(path: &Path) -> Result<ConfigLayer> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(ConfigLayer::default());
        }
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn env_layer() -> ConfigLayer {
        ConfigLayer {
            api_base_url: non_empty_env("EXTMAN_API_BASE_URL"),
            api_key: non_empty_env("EXTMAN_API_KEY"),
            catalog_path: non_empty_env("EXTMAN_CATALOG_PATH").map(PathBuf::from),
            extensions_dir: non_empty_env("EXTMAN_EXTENSIONS_PATH").map(PathBuf::from),
            ..ConfigLayer::default()
        }
    }

    fn resolve(&self, layer: ConfigLayer) -> Result<ExtmanConfig> {
        let catalog_filename = required(layer.catalog_filename, "catalog_filename")?;
        let api_base_url = required(layer.api_base_url, "api_base_url")?;

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(Error::invalid_config(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                api_base_url
            )));
        }

        let catalog_path = layer
            .catalog_path
            .unwrap_or_else(|| self.config_dir.join(&catalog_filename));
        let extensions_dir = layer
            .extensions_dir
            .unwrap_or_else(|| self.config_dir.join(DEFAULT_EXTENSIONS_DIRNAME));

        Ok(ExtmanConfig {
            config_dir: self.config_dir.clone(),
            api_base_url,
            api_key: layer.api_key,
            catalog_path,
            extensions_dir,
            binary_prefix: required(layer.binary_prefix, "binary_prefix")?,
            fragment_filename: required(layer.fragment_filename, "fragment_filename")?,
            catalog_filename,
            distribution_endpoint: required(layer.distribution_endpoint, "distribution_endpoint")?,
            user_agent: layer
                .user_agent
                .unwrap_or_else(|| format!("extman/{}", env!("CARGO_PKG_VERSION"))),
        })
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::invalid_config(format!("{} must not be empty", key))),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
