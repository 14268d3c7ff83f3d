//! Consumer-facing availability queries.
//!
//! These functions sit on top of [`IntervalStore`] and are what report and
//! rendering code should call:
//!
//! ```no_run
//! use std::sync::Arc;
//! use soda_availability::archive::SoarClient;
//! use soda_availability::cache::FileCacheStore;
//! use soda_availability::services::{availability, IntervalStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = IntervalStore::new(
//!         Arc::new(SoarClient::with_defaults()?),
//!         Arc::new(FileCacheStore::new(".data")),
//!     );
//!     for range in availability::coverage_for(&store, "MAG-RTN-NORMAL").await? {
//!         println!("{}", range);
//!     }
//!     Ok(())
//! }
//! ```

use futures::future::join_all;
use log::{info, warn};

use crate::error::{FetchError, FetchResult};
use crate::models::{DataProduct, DayRange, Interval};

use super::consolidate::{consolidate, covered_days};
use super::interval_store::IntervalStore;

/// Raw intervals for a science-data descriptor.
pub async fn intervals_for(store: &IntervalStore, descriptor: &str) -> FetchResult<Vec<Interval>> {
    intervals_for_product(store, &DataProduct::new(descriptor)).await
}

/// Raw intervals for any product.
pub async fn intervals_for_product(
    store: &IntervalStore,
    product: &DataProduct,
) -> FetchResult<Vec<Interval>> {
    store.get_intervals(product).await
}

/// Consolidated day coverage for a science-data descriptor.
pub async fn coverage_for(store: &IntervalStore, descriptor: &str) -> FetchResult<Vec<DayRange>> {
    coverage_for_product(store, &DataProduct::new(descriptor)).await
}

/// Consolidated day coverage for any product.
pub async fn coverage_for_product(
    store: &IntervalStore,
    product: &DataProduct,
) -> FetchResult<Vec<DayRange>> {
    let intervals = store.get_intervals(product).await?;
    Ok(consolidate(&intervals))
}

/// Coverage of one product inside a report.
#[derive(Debug)]
pub struct ProductAvailability {
    pub product: DataProduct,
    pub outcome: FetchResult<ProductCoverage>,
}

/// Successful lookup of one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCoverage {
    /// Number of raw intervals the archive listed
    pub interval_count: usize,
    pub coverage: Vec<DayRange>,
}

impl ProductCoverage {
    pub fn covered_days(&self) -> i64 {
        covered_days(&self.coverage)
    }
}

/// Availability of several products, in request order.
#[derive(Debug, Default)]
pub struct AvailabilityReport {
    pub products: Vec<ProductAvailability>,
}

impl AvailabilityReport {
    /// Products whose lookup succeeded.
    pub fn successes(&self) -> impl Iterator<Item = (&DataProduct, &ProductCoverage)> {
        self.products
            .iter()
            .filter_map(|p| p.outcome.as_ref().ok().map(|c| (&p.product, c)))
    }

    /// Products whose lookup failed, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (&DataProduct, &FetchError)> {
        self.products
            .iter()
            .filter_map(|p| p.outcome.as_ref().err().map(|e| (&p.product, e)))
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Look up every product concurrently.
///
/// A failure is recorded against its product and never affects the others.
pub async fn build_report(store: &IntervalStore, products: &[DataProduct]) -> AvailabilityReport {
    info!("Building availability report for {} products", products.len());

    let lookups = products.iter().map(|product| async move {
        let outcome = store
            .get_intervals(product)
            .await
            .map(|intervals| ProductCoverage {
                interval_count: intervals.len(),
                coverage: consolidate(&intervals),
            });
        if let Err(ref e) = outcome {
            warn!("{}: availability unavailable: {}", product, e);
        }
        ProductAvailability {
            product: product.clone(),
            outcome,
        }
    });

    AvailabilityReport {
        products: join_all(lookups).await,
    }
}
