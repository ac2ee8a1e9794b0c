//! Configuration loading and management
//!
//! Handles parsing of `tasklist.toml` configuration files.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::storage::validate_key;
use crate::store::DEFAULT_KEY;

/// Name of the configuration file inside the data directory
pub const CONFIG_FILE: &str = "tasklist.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Storage-related configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Data directory; the platform data dir when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Slot holding the task collection
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: default_key(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            Error::InvalidConfig(format!("cannot read {}: {err}", path.display()))
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `tasklist.toml` from a data directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Resolve configuration for the CLI.
    ///
    /// An explicit config file must load. Otherwise the data directory's
    /// `tasklist.toml` is used when readable. `dir_override` wins over
    /// `storage.dir`.
    pub fn resolve(explicit: Option<&Path>, dir_override: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let dir = match dir_override {
                    Some(dir) => dir.to_path_buf(),
                    None => default_data_dir()?,
                };
                Self::load_from_dir(&dir)
            }
        };
        if let Some(dir) = dir_override {
            config.storage.dir = Some(dir.to_path_buf());
        }
        Ok(config)
    }

    /// Directory the task slot lives in
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    fn validate(&self) -> Result<()> {
        validate_key(&self.storage.key)
            .map_err(|err| Error::InvalidConfig(format!("storage.key: {err}")))
    }
}

/// Platform data directory, e.g. `~/.local/share/tasklist` on Linux
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "tasklist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| Error::InvalidConfig("cannot determine a home directory".to_string()))
}
