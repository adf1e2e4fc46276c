//! Configuration management for whpetitions
//!
//! Every field has a default, so a missing config file is not an error.
//! Command-line flags and environment variables override file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheStorage;
use crate::client::petitions::{API_BASE_URL, FETCH_TIMEOUT, PAGE_LIMIT};
use crate::error::{ConfigError, Result};
use crate::store::Store;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the petitions API
    pub api_base_url: String,

    /// Address the HTTP server binds to
    pub bind: String,

    /// SQLite file for the durable store (defaults to the XDG data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// SQLite file for the view cache (defaults to the user cache dir).
    /// Every process on one store must share it so refreshes flush it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,

    /// Transport deadline for one upstream fetch
    pub fetch_timeout_secs: u64,

    /// Page size requested from the upstream
    pub page_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            bind: "127.0.0.1:8080".to_string(),
            store_path: None,
            cache_path: None,
            fetch_timeout_secs: FETCH_TIMEOUT.as_secs(),
            page_limit: PAGE_LIMIT,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".whpetitions").join("config.yaml"))
    }

    /// Load from `path`, or the default path when `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load_at(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Invalid(format!(
                        "Config file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                Self::load_from(path)
            }
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    log::debug!("No config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail later and less clearly
    pub fn validate(&self) -> Result<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            ))
            .into());
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_secs must be > 0".to_string()).into());
        }
        if self.page_limit == 0 {
            return Err(ConfigError::Invalid("page_limit must be > 0".to_string()).into());
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Store path, falling back to the data directory
    pub fn resolved_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Store::default_path()?),
        }
    }

    /// View cache path, falling back to the cache directory
    pub fn resolved_cache_path(&self) -> Result<PathBuf> {
        match &self.cache_path {
            Some(path) => Ok(path.clone()),
            None => Ok(CacheStorage::default_path()?),
        }
    }
}
