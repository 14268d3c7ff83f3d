//! In-memory cache store.
//!
//! Entries live as long as the store. Useful for tests and for processes that
//! only need to deduplicate fetches within their own lifetime.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::FetchResult;
use crate::models::{DataProduct, Interval};

use super::CacheStore;

type Entries = HashMap<DataProduct, BTreeMap<NaiveDate, Vec<Interval>>>;

/// Map-backed [`CacheStore`]. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct LocalCacheStore {
    entries: Arc<RwLock<Entries>>,
}

impl LocalCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all products.
    pub fn len(&self) -> usize {
        self.entries.read().values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for LocalCacheStore {
    async fn read(
        &self,
        product: &DataProduct,
        date: NaiveDate,
    ) -> FetchResult<Option<Vec<Interval>>> {
        Ok(self
            .entries
            .read()
            .get(product)
            .and_then(|days| days.get(&date))
            .cloned())
    }

    async fn write(
        &self,
        product: &DataProduct,
        date: NaiveDate,
        intervals: &[Interval],
    ) -> FetchResult<()> {
        self.entries
            .write()
            .entry(product.clone())
            .or_default()
            .insert(date, intervals.to_vec());
        Ok(())
    }

    async fn entry_dates(&self, product: &DataProduct) -> FetchResult<Vec<NaiveDate>> {
        Ok(self
            .entries
            .read()
            .get(product)
            .map(|days| days.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn remove(&self, product: &DataProduct, date: NaiveDate) -> FetchResult<bool> {
        let mut entries = self.entries.write();
        let removed = entries
            .get_mut(product)
            .map(|days| days.remove(&date).is_some())
            .unwrap_or(false);
        if entries.get(product).is_some_and(BTreeMap::is_empty) {
            entries.remove(product);
        }
        Ok(removed)
    }
}
