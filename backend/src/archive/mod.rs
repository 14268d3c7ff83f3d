//! Remote catalog access.
//!
//! The archive exposes a TAP endpoint answering ADQL queries. This module
//! turns a [`DataProduct`] into such a query, executes it, and parses the
//! JSON answer into raw [`Interval`]s.
//!
//! ```text
//! DataProduct ──► CatalogQuery (query.rs) ──► HTTP GET (client.rs)
//!                                                 │
//!               Vec<Interval> ◄── TapResponse (response.rs)
//! ```
//!
//! The [`IntervalSource`] trait is the seam the interval store depends on;
//! [`SoarClient`] is the production implementation.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::fmt;

use crate::error::FetchResult;
use crate::models::time::format_query_timestamp;
use crate::models::{DataProduct, Interval};

#[cfg(feature = "http-client")]
pub mod client;
pub mod query;
pub mod response;

#[cfg(feature = "http-client")]
pub use client::SoarClient;
pub use query::CatalogQuery;
pub use response::{parse_response, TapResponse};

/// Default TAP endpoint of the Solar Orbiter archive.
pub const DEFAULT_BASE_URL: &str = "http://soar.esac.esa.int/soar-sl-tap/tap";

/// Time bounds of a full-history query, `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl QueryWindow {
    pub fn new(begin: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { begin, end }
    }

    /// `(begin, end)` in the archive's `+`-delimited representation.
    pub fn formatted(&self) -> (String, String) {
        (
            format_query_timestamp(&self.begin),
            format_query_timestamp(&self.end),
        )
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (begin, end) = self.formatted();
        write!(f, "{} .. {}", begin, end)
    }
}

/// Anything able to list the data intervals of a product.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; the store shares one instance
/// across concurrent product requests.
#[async_trait]
pub trait IntervalSource: Send + Sync {
    /// Fetch every interval the archive holds for `product`.
    ///
    /// # Returns
    /// * `Ok(Vec<Interval>)` - Intervals in archive row order; empty when the
    ///   archive has no rows (unknown descriptors look the same)
    /// * `Err(FetchError)` - Network, protocol or validation failure
    async fn fetch(&self, product: &DataProduct, window: &QueryWindow)
        -> FetchResult<Vec<Interval>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_formatting() {
        let begin = crate::models::time::mission_epoch();
        let end =
            NaiveDateTime::parse_from_str("2021-06-01 12:34:56.789", "%Y-%m-%d %H:%M:%S%.f")
                .unwrap();
        let window = QueryWindow::new(begin, end);
        assert_eq!(
            window.formatted(),
            (
                "2020-01-01+00:00:00".to_string(),
                "2021-06-01+12:34:56".to_string()
            )
        );
        assert_eq!(window.to_string(), "2020-01-01+00:00:00 .. 2021-06-01+12:34:56");
    }
}
