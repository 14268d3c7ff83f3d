//! HTTP client for the archive's synchronous TAP endpoint.

use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;

use crate::error::{ErrorContext, FetchError, FetchResult};
use crate::models::{DataProduct, Interval};

use super::query::CatalogQuery;
use super::response::parse_response;
use super::{IntervalSource, QueryWindow, DEFAULT_BASE_URL};

/// Default bound on a single catalog request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed [`IntervalSource`].
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SoarClient {
    http: reqwest::Client,
    base_url: String,
}

impl SoarClient {
    /// Client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                FetchError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Client for the public archive with the default timeout.
    pub fn with_defaults() -> FetchResult<Self> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn execute(&self, query: &CatalogQuery) -> FetchResult<String> {
        let url = CatalogQuery::endpoint(&self.base_url);
        debug!("GET {} QUERY={}", url, query.adql());

        let response = self.http.get(&url).query(&query.params()).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::network_with_context(
                format!("archive answered {}", status),
                ErrorContext::default().with_details(truncate(body.trim(), 200)),
            ));
        }

        Ok(body)
    }
}

#[async_trait]
impl IntervalSource for SoarClient {
    async fn fetch(
        &self,
        product: &DataProduct,
        window: &QueryWindow,
    ) -> FetchResult<Vec<Interval>> {
        let query = CatalogQuery::for_product(product, *window)?;
        info!("Updating intervals for {} ({})", product, query.window());

        let body = self
            .execute(&query)
            .await
            .map_err(|e| e.with_operation("fetch").with_product(product))?;
        let intervals = parse_response(&body)
            .map_err(|e| e.with_operation("fetch").with_product(product))?;

        debug!("{}: archive returned {} rows", product, intervals.len());
        Ok(intervals)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use crate::models::time::mission_epoch;

    #[test]
    fn test_client_keeps_base_url() {
        let client = SoarClient::new("http://localhost:9/tap", Duration::from_millis(50)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9/tap");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[tokio::test]
    async fn test_invalid_descriptor_fails_before_network() {
        // Port 9 is never contacted: validation fails first.
        let client = SoarClient::new("http://127.0.0.1:9/tap", Duration::from_millis(50)).unwrap();
        let window = QueryWindow::new(mission_epoch(), mission_epoch());
        let err = client
            .fetch(&DataProduct::new("bad\u{0}descriptor"), &window)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_unreachable_archive_is_network_error() {
        let client = SoarClient::new("http://127.0.0.1:9/tap", Duration::from_millis(500)).unwrap();
        let window = QueryWindow::new(mission_epoch(), mission_epoch());
        let err = client
            .fetch(&DataProduct::new("MAG-RTN-NORMAL"), &window)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Network);
        assert!(err.is_retryable());
        assert_eq!(err.context().operation.as_deref(), Some("fetch"));
    }
}
