//! Availability configuration file support.
//!
//! Settings are read from an `availability.toml` file, from environment
//! variables, or both (file first, then `apply_env`).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::archive::DEFAULT_BASE_URL;
use crate::cache::{CacheType, RetentionPolicy};
use crate::error::{FetchError, FetchResult};
use crate::models::time::{parse_timestamp, MISSION_EPOCH};

/// Full configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    #[serde(default)]
    pub archive: ArchiveSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Remote archive settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_mission_epoch")]
    pub mission_epoch: String,
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(rename = "type", default = "default_cache_type")]
    pub cache_type: String,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_retention")]
    pub retention: String,
    #[serde(default = "default_serve_stale")]
    pub serve_stale_on_error: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_mission_epoch() -> String {
    MISSION_EPOCH.to_string()
}

fn default_cache_type() -> String {
    "file".to_string()
}

fn default_directory() -> PathBuf {
    PathBuf::from(".data")
}

fn default_retention() -> String {
    "latest".to_string()
}

fn default_serve_stale() -> bool {
    true
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            mission_epoch: default_mission_epoch(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_type: default_cache_type(),
            directory: default_directory(),
            retention: default_retention(),
            serve_stale_on_error: default_serve_stale(),
        }
    }
}

impl ArchiveSettings {
    /// Per-request timeout. Zero is rejected: the fetch must stay bounded.
    pub fn timeout(&self) -> FetchResult<Duration> {
        if self.timeout_secs == 0 {
            return Err(FetchError::configuration(
                "archive.timeout_secs must be greater than zero",
            ));
        }
        Ok(Duration::from_secs(self.timeout_secs))
    }

    pub fn mission_epoch(&self) -> FetchResult<NaiveDateTime> {
        parse_timestamp(&self.mission_epoch).ok_or_else(|| {
            FetchError::configuration(format!(
                "Invalid archive.mission_epoch: {}",
                self.mission_epoch
            ))
        })
    }
}

impl CacheSettings {
    pub fn cache_type(&self) -> FetchResult<CacheType> {
        self.cache_type
            .parse()
            .map_err(|e| FetchError::configuration(format!("Invalid cache type: {}", e)))
    }

    pub fn retention(&self) -> FetchResult<RetentionPolicy> {
        self.retention
            .parse()
            .map_err(|e| FetchError::configuration(format!("Invalid cache retention: {}", e)))
    }
}

impl AvailabilityConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(AvailabilityConfig)` if successful
    /// * `Err(FetchError)` if the file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> FetchResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            FetchError::configuration(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> FetchResult<Self> {
        let config: AvailabilityConfig = toml::from_str(content).map_err(|e| {
            FetchError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `availability.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> FetchResult<Self> {
        let search_paths = [
            PathBuf::from("availability.toml"),
            PathBuf::from("backend/availability.toml"),
            PathBuf::from("../availability.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(FetchError::configuration(
            "No availability.toml found in standard locations",
        ))
    }

    /// Defaults overridden by environment variables.
    ///
    /// # Environment Variables
    /// - `SODA_ARCHIVE_URL`: TAP base URL
    /// - `SODA_FETCH_TIMEOUT_SECS`: per-request timeout in seconds
    /// - `SODA_CACHE_TYPE`: `file` | `local`
    /// - `SODA_CACHE_DIR`: cache directory for the file store
    pub fn from_env() -> FetchResult<Self> {
        Self::default().apply_env()
    }

    /// Override fields with any `SODA_*` variables that are set.
    pub fn apply_env(mut self) -> FetchResult<Self> {
        if let Ok(url) = env::var("SODA_ARCHIVE_URL") {
            self.archive.base_url = url;
        }
        if let Ok(timeout) = env::var("SODA_FETCH_TIMEOUT_SECS") {
            self.archive.timeout_secs = timeout.parse().map_err(|_| {
                FetchError::configuration("SODA_FETCH_TIMEOUT_SECS must be a whole number")
            })?;
        }
        if let Ok(cache_type) = env::var("SODA_CACHE_TYPE") {
            self.cache.cache_type = cache_type;
        }
        if let Ok(dir) = env::var("SODA_CACHE_DIR") {
            self.cache.directory = PathBuf::from(dir);
        }
        self.validate()?;
        Ok(self)
    }

    /// Check every field that is parsed lazily.
    pub fn validate(&self) -> FetchResult<()> {
        self.archive.timeout()?;
        self.archive.mission_epoch()?;
        self.cache.cache_type()?;
        self.cache.retention()?;
        Ok(())
    }
}
