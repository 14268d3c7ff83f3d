//! Cache store factory.
//!
//! Creates [`CacheStore`] instances from runtime configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::CacheSettings;
use crate::error::{FetchError, FetchResult};

use super::{CacheStore, CacheType, FileCacheStore, LocalCacheStore};

/// Factory for cache store instances.
///
/// # Example
/// ```no_run
/// use soda_availability::cache::{CacheFactory, CacheType};
///
/// let disk = CacheFactory::create(CacheType::File, Some(".data".as_ref())).unwrap();
/// let memory = CacheFactory::create_local();
/// ```
pub struct CacheFactory;

impl CacheFactory {
    /// Create a cache store based on type.
    ///
    /// # Arguments
    /// * `cache_type` - Type of store to create
    /// * `directory` - Root directory (required for [`CacheType::File`])
    pub fn create(
        cache_type: CacheType,
        directory: Option<&Path>,
    ) -> FetchResult<Arc<dyn CacheStore>> {
        match cache_type {
            CacheType::File => {
                let dir = directory.ok_or_else(|| {
                    FetchError::configuration("File cache requires a cache directory")
                })?;
                Ok(Self::create_file(dir))
            }
            CacheType::Local => Ok(Self::create_local()),
        }
    }

    /// Create an on-disk store rooted at `directory`.
    pub fn create_file(directory: impl Into<PathBuf>) -> Arc<dyn CacheStore> {
        Arc::new(FileCacheStore::new(directory))
    }

    /// Create an in-memory store.
    pub fn create_local() -> Arc<dyn CacheStore> {
        Arc::new(LocalCacheStore::new())
    }

    /// Create a store from the `[cache]` section of the configuration.
    pub fn from_settings(settings: &CacheSettings) -> FetchResult<Arc<dyn CacheStore>> {
        Self::create(settings.cache_type()?, Some(settings.directory.as_path()))
    }
}

/// Builder for configuring cache store creation.
pub struct CacheBuilder {
    cache_type: CacheType,
    directory: Option<PathBuf>,
}

impl CacheBuilder {
    /// New builder; the type defaults to `SODA_CACHE_TYPE` or file.
    pub fn new() -> Self {
        Self {
            cache_type: CacheType::from_env(),
            directory: std::env::var("SODA_CACHE_DIR").ok().map(PathBuf::from),
        }
    }

    pub fn cache_type(mut self, cache_type: CacheType) -> Self {
        self.cache_type = cache_type;
        self
    }

    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn build(self) -> FetchResult<Arc<dyn CacheStore>> {
        CacheFactory::create(self.cache_type, self.directory.as_deref())
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
