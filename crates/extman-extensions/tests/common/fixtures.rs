//! Temporary config directories and resolved configs

use extman_core::ExtmanConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::constants::*;

/// Isolated config directory for one test
pub struct TestEnv {
    pub temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.temp_dir.path().join(".extman")
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.config_dir().join(CATALOG_FILENAME)
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.config_dir().join("plugins")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("config.yaml")
    }

    /// Resolved config pointing at `api_base_url` with the test credential
    pub fn config(&self, api_base_url: &str) -> ExtmanConfig {
        ExtmanConfig {
            config_dir: self.config_dir(),
            api_base_url: api_base_url.to_string(),
            api_key: Some(TEST_API_KEY.to_string()),
            catalog_path: self.catalog_path(),
            extensions_dir: self.extensions_dir(),
            binary_prefix: BINARY_PREFIX.to_string(),
            fragment_filename: FRAGMENT_FILENAME.to_string(),
            catalog_filename: CATALOG_FILENAME.to_string(),
            distribution_endpoint: DISTRIBUTION_ENDPOINT.to_string(),
            user_agent: "extman-tests".to_string(),
        }
    }

    /// Config for tests that must never reach the network
    pub fn offline_config(&self) -> ExtmanConfig {
        let mut config = self.config("http://127.0.0.1:9");
        config.api_key = None;
        config
    }

    /// Write an archive into the temp dir and return its path
    pub fn write_archive(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }
}

/// Whether `path` is a file with the executable bit set
pub fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
