//! Installed extensions index
//!
//! The set of installed extension names lives in the user config file under
//! a single key:
//! ```yaml
//! installed_extensions:
//!   - hello
//!   - apps
//! ```
//! Only that key is rewritten; every other setting in the file is preserved.
//! Updates hold an exclusive lock on `config.yaml.lock` across the
//! read-modify-write, so concurrent installs never drop each other's names.

use crate::error::{Error, Result};
use crate::utils::{parent_dir, write_atomic};
use fs4::fs_std::FileExt;
use serde_yaml_ng::{Mapping, Value};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key holding the installed extension names
pub const INSTALLED_FIELD: &str = "installed_extensions";

/// Set of installed extension names persisted in config.yaml
pub struct InstalledIndex {
    config_path: PathBuf,
}

impl InstalledIndex {
    /// Create an index backed by the given config file
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Path of the backing config file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Installed names in insertion order
    pub fn list(&self) -> Result<Vec<String>> {
        let mapping = self.read_mapping()?;
        match mapping.get(INSTALLED_FIELD) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_yaml_ng::from_value(value.clone()).map_err(|e| {
                Error::invalid_config(format!(
                    "{} in {} must be a list of names: {}",
                    INSTALLED_FIELD,
                    self.config_path.display(),
                    e
                ))
            }),
        }
    }

    /// Whether `name` is recorded as installed
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|n| n == name))
    }

    /// Record `name` as installed; returns false when it was already present
    pub fn add(&self, name: &str) -> Result<bool> {
        let _lock = self.lock()?;
        let mut names = self.list()?;
        if names.iter().any(|n| n == name) {
            debug!("{} already recorded as installed", name);
            return Ok(false);
        }
        names.push(name.to_string());
        self.write(names)?;
        Ok(true)
    }

    /// Forget `name`; returns false when it was not present
    pub fn remove(&self, name: &str) -> Result<bool> {
        let _lock = self.lock()?;
        let mut names = self.list()?;
        let before = names.len();
        names.retain(|n| n != name);
        if names.len() == before {
            return Ok(false);
        }
        self.write(names)?;
        Ok(true)
    }

    /// Exclusive lock on the sidecar lock file, released when dropped
    fn lock(&self) -> Result<File> {
        let mut name = self
            .config_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "config".into());
        name.push(".lock");
        let path = parent_dir(&self.config_path).join(name);
        std::fs::create_dir_all(parent_dir(&path))?;

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.lock_exclusive()
            .map_err(|e| Error::conflict(self.config_path.display().to_string(), e))?;
        Ok(file)
    }

    fn read_mapping(&self) -> Result<Mapping> {
        if !self.config_path.exists() {
            return Ok(Mapping::new());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        if content.trim().is_empty() {
            return Ok(Mapping::new());
        }

        match serde_yaml_ng::from_str::<Value>(&content) {
            Ok(Value::Mapping(mapping)) => Ok(mapping),
            Ok(Value::Null) => Ok(Mapping::new()),
            Ok(_) => Err(Error::invalid_config(format!(
                "{} is not a mapping",
                self.config_path.display()
            ))),
            Err(e) => Err(Error::invalid_config(format!(
                "Failed to parse {}: {}",
                self.config_path.display(),
                e
            ))),
        }
    }

    fn write(&self, names: Vec<String>) -> Result<()> {
        let mut mapping = self.read_mapping()?;
        let list = names.into_iter().map(Value::String).collect();
        mapping.insert(Value::String(INSTALLED_FIELD.to_string()), Value::Sequence(list));

        let content = serde_yaml_ng::to_string(&mapping).map_err(|e| {
            Error::invalid_config(format!("Failed to serialize installed index: {}", e))
        })?;
        write_atomic(&self.config_path, content.as_bytes())
    }
}
