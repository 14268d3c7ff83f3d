//! Daily-cached interval lookup.
//!
//! The store answers "which intervals does the archive hold for this
//! product" with at most one remote query per product per calendar day:
//!
//! 1. Look up the entry for `(product, today)`.
//! 2. On a hit, return it; no remote call is made.
//! 3. On a miss (or an unreadable entry), query the full history
//!    `[mission epoch, now)`, persist it as today's entry, return it.
//!
//! A failed refresh never removes existing entries. If an older entry exists
//! and stale serving is enabled, it is returned instead of the error.

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::archive::{IntervalSource, QueryWindow};
use crate::cache::{CacheStore, RetentionPolicy};
use crate::clock::{Clock, SystemClock};
use crate::config::AvailabilityConfig;
use crate::error::{FetchError, FetchResult};
use crate::models::time::mission_epoch;
use crate::models::{DataProduct, Interval};

/// Behavioural knobs of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    /// Lower bound of every full-history query
    pub mission_epoch: NaiveDateTime,
    /// What to do with older entries after a successful refresh
    pub retention: RetentionPolicy,
    /// Return the newest older entry when a refresh fails
    pub serve_stale_on_error: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            mission_epoch: mission_epoch(),
            retention: RetentionPolicy::default(),
            serve_stale_on_error: true,
        }
    }
}

impl StoreSettings {
    pub fn from_config(config: &AvailabilityConfig) -> FetchResult<Self> {
        Ok(Self {
            mission_epoch: config.archive.mission_epoch()?,
            retention: config.cache.retention()?,
            serve_stale_on_error: config.cache.serve_stale_on_error,
        })
    }
}

/// Where a returned interval list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalOrigin {
    /// Today's cache entry
    Cache,
    /// A fresh remote query
    Remote,
    /// An older cache entry, served because the refresh failed
    Stale(NaiveDate),
}

/// Interval store over a remote source and a cache.
#[derive(Clone)]
pub struct IntervalStore {
    source: Arc<dyn IntervalSource>,
    cache: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    settings: StoreSettings,
}

impl IntervalStore {
    /// Store using the system clock and default settings.
    pub fn new(source: Arc<dyn IntervalSource>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            source,
            cache,
            clock: Arc::new(SystemClock),
            settings: StoreSettings::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: StoreSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Store backed by the archive client and cache described by `config`.
    #[cfg(feature = "http-client")]
    pub fn from_config(config: &AvailabilityConfig) -> FetchResult<Self> {
        let source = crate::archive::SoarClient::new(
            config.archive.base_url.clone(),
            config.archive.timeout()?,
        )?;
        let cache = crate::cache::CacheFactory::from_settings(&config.cache)?;
        Ok(Self::new(Arc::new(source), cache).with_settings(StoreSettings::from_config(config)?))
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Raw interval list for `product`.
    ///
    /// # Errors
    /// * `ValidationError` - the descriptor cannot be queried
    /// * the source's error, when the refresh fails and no usable older
    ///   entry exists
    pub async fn get_intervals(&self, product: &DataProduct) -> FetchResult<Vec<Interval>> {
        self.get_intervals_traced(product)
            .await
            .map(|(intervals, _)| intervals)
    }

    /// Like [`get_intervals`](Self::get_intervals), also reporting where the
    /// list came from.
    pub async fn get_intervals_traced(
        &self,
        product: &DataProduct,
    ) -> FetchResult<(Vec<Interval>, IntervalOrigin)> {
        product
            .validate()
            .map_err(|e| e.with_operation("get_intervals"))?;

        let now = self.clock.now();
        let today = now.date();

        match self.cache.read(product, today).await {
            Ok(Some(intervals)) => {
                debug!("{}: cache hit for {} ({} intervals)", product, today, intervals.len());
                return Ok((intervals, IntervalOrigin::Cache));
            }
            Ok(None) => debug!("{}: no cache entry for {}", product, today),
            Err(e) => warn!("{}: unreadable cache entry, refetching: {}", product, e),
        }

        let window = QueryWindow::new(self.settings.mission_epoch, now);
        let intervals = match self.source.fetch(product, &window).await {
            Ok(intervals) => intervals,
            Err(err) => return self.fallback(product, today, err).await,
        };

        self.persist(product, today, &intervals).await;
        Ok((intervals, IntervalOrigin::Remote))
    }

    async fn persist(&self, product: &DataProduct, today: NaiveDate, intervals: &[Interval]) {
        if let Err(e) = self.cache.write(product, today, intervals).await {
            warn!("{}: failed to write cache entry for {}: {}", product, today, e);
            return;
        }
        info!("{}: cached {} intervals for {}", product, intervals.len(), today);

        if self.settings.retention == RetentionPolicy::KeepLatest {
            match self.cache.prune_before(product, today).await {
                Ok(0) => {}
                Ok(n) => debug!("{}: pruned {} old cache entries", product, n),
                Err(e) => warn!("{}: failed to prune old cache entries: {}", product, e),
            }
        }
    }

    async fn fallback(
        &self,
        product: &DataProduct,
        today: NaiveDate,
        err: FetchError,
    ) -> FetchResult<(Vec<Interval>, IntervalOrigin)> {
        if !self.settings.serve_stale_on_error {
            return Err(err);
        }
        match self.cache.latest_before(product, today).await {
            Ok(Some(entry)) => {
                warn!(
                    "{}: refresh failed, serving cache entry from {}: {}",
                    product, entry.date, err
                );
                Ok((entry.intervals, IntervalOrigin::Stale(entry.date)))
            }
            Ok(None) => Err(err),
            Err(cache_err) => {
                warn!("{}: could not look for older cache entries: {}", product, cache_err);
                Err(err)
            }
        }
    }
}
