//! Per-product, per-day interval cache.
//!
//! A cache entry is the raw interval list of one product as fetched on one
//! calendar day. Entries are written whole and never edited; a newer day's
//! entry supersedes older ones.
//!
//! # Implementations
//! - [`FileCacheStore`]: CSV files on disk, atomically replaced
//! - [`LocalCacheStore`]: in-memory, for tests and short-lived processes

use async_trait::async_trait;
use chrono::NaiveDate;
use log::warn;
use std::str::FromStr;

use crate::error::FetchResult;
use crate::models::{DataProduct, Interval};

pub mod factory;
pub mod file;
pub mod local;

pub use factory::{CacheBuilder, CacheFactory};
pub use file::FileCacheStore;
pub use local::LocalCacheStore;

/// A cached raw interval list and the day it was fetched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub date: NaiveDate,
    pub intervals: Vec<Interval>,
}

/// What happens to older entries once a new one is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Delete every older entry of the product.
    #[default]
    KeepLatest,
    /// Let entries accumulate.
    KeepAll,
}

impl FromStr for RetentionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latest" | "keep_latest" => Ok(Self::KeepLatest),
            "all" | "keep_all" => Ok(Self::KeepAll),
            _ => Err(format!("Unknown retention policy: {}", s)),
        }
    }
}

/// Cache backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheType {
    /// CSV files under a cache directory
    File,
    /// In-memory map
    Local,
}

impl FromStr for CacheType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "disk" => Ok(Self::File),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown cache type: {}", s)),
        }
    }
}

impl CacheType {
    /// Read `SODA_CACHE_TYPE`, defaulting to [`CacheType::File`].
    pub fn from_env() -> Self {
        std::env::var("SODA_CACHE_TYPE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::File)
    }
}

/// Storage for cache entries.
///
/// Writes must be atomic per `(product, date)`: a reader sees either the
/// previous state or the complete new entry.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the entry for `product` fetched on `date`.
    ///
    /// # Returns
    /// * `Ok(None)` - No entry for that day
    /// * `Ok(Some(intervals))` - The cached raw interval list
    /// * `Err(FetchError)` - The entry exists but could not be read
    async fn read(&self, product: &DataProduct, date: NaiveDate)
        -> FetchResult<Option<Vec<Interval>>>;

    /// Store `intervals` as the entry for `product` on `date`, replacing any
    /// existing entry for that key.
    async fn write(
        &self,
        product: &DataProduct,
        date: NaiveDate,
        intervals: &[Interval],
    ) -> FetchResult<()>;

    /// Dates of all entries for `product`, ascending.
    async fn entry_dates(&self, product: &DataProduct) -> FetchResult<Vec<NaiveDate>>;

    /// Delete one entry. Returns whether it existed.
    async fn remove(&self, product: &DataProduct, date: NaiveDate) -> FetchResult<bool>;

    /// Most recent readable entry strictly older than `date`.
    async fn latest_before(
        &self,
        product: &DataProduct,
        date: NaiveDate,
    ) -> FetchResult<Option<CacheEntry>> {
        let dates = self.entry_dates(product).await?;
        for candidate in dates.into_iter().rev().filter(|d| *d < date) {
            match self.read(product, candidate).await {
                Ok(Some(intervals)) => {
                    return Ok(Some(CacheEntry {
                        date: candidate,
                        intervals,
                    }))
                }
                Ok(None) => {}
                Err(e) => warn!(
                    "{}: skipping unreadable cache entry from {}: {}",
                    product, candidate, e
                ),
            }
        }
        Ok(None)
    }

    /// Delete every entry of `product` older than `keep`. Returns the number
    /// of entries removed.
    async fn prune_before(&self, product: &DataProduct, keep: NaiveDate) -> FetchResult<usize> {
        let mut removed = 0;
        for date in self.entry_dates(product).await? {
            if date < keep && self.remove(product, date).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_from_str() {
        assert_eq!("latest".parse::<RetentionPolicy>().unwrap(), RetentionPolicy::KeepLatest);
        assert_eq!("ALL".parse::<RetentionPolicy>().unwrap(), RetentionPolicy::KeepAll);
        assert!("forever".parse::<RetentionPolicy>().is_err());
    }

    #[test]
    fn test_cache_type_from_str() {
        assert_eq!("file".parse::<CacheType>().unwrap(), CacheType::File);
        assert_eq!("Memory".parse::<CacheType>().unwrap(), CacheType::Local);
        let err = "redis".parse::<CacheType>().unwrap_err();
        assert!(err.contains("Unknown cache type"));
    }
}
