//! ADQL catalog query construction.

use crate::error::FetchResult;
use crate::models::DataProduct;

use super::QueryWindow;

/// A synchronous TAP query for one product.
///
/// The query always selects the product's full history; the window is kept
/// alongside for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    adql: String,
    window: QueryWindow,
}

impl CatalogQuery {
    /// Build the query, escaping the descriptor for an ADQL string literal.
    ///
    /// # Errors
    /// `ValidationError` if the descriptor cannot be embedded safely.
    pub fn for_product(product: &DataProduct, window: QueryWindow) -> FetchResult<Self> {
        let descriptor = product.escaped_descriptor()?;
        let adql = format!(
            "SELECT * FROM {} WHERE descriptor='{}'",
            product.stream().table(),
            descriptor
        );
        Ok(Self { adql, window })
    }

    pub fn adql(&self) -> &str {
        &self.adql
    }

    pub fn window(&self) -> &QueryWindow {
        &self.window
    }

    /// Query-string parameters for the `/sync` endpoint.
    ///
    /// Values are raw; the HTTP client URL-encodes them.
    pub fn params(&self) -> [(&'static str, &str); 4] {
        [
            ("REQUEST", "doQuery"),
            ("LANG", "ADQL"),
            ("FORMAT", "JSON"),
            ("QUERY", self.adql.as_str()),
        ]
    }

    /// Endpoint URL for a given TAP base URL.
    pub fn endpoint(base_url: &str) -> String {
        format!("{}/sync", base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use crate::models::time::mission_epoch;

    fn window() -> QueryWindow {
        QueryWindow::new(mission_epoch(), mission_epoch() + chrono::Duration::days(400))
    }

    #[test]
    fn test_science_query() {
        let q = CatalogQuery::for_product(&DataProduct::new("MAG-RTN-NORMAL"), window()).unwrap();
        assert_eq!(
            q.adql(),
            "SELECT * FROM v_sc_data_item WHERE descriptor='MAG-RTN-NORMAL'"
        );
        assert_eq!(*q.window(), window());
    }

    #[test]
    fn test_low_latency_query_uses_ll_table() {
        let q = CatalogQuery::for_product(&DataProduct::low_latency("SWA-PAS-MOM"), window())
            .unwrap();
        assert!(q.adql().starts_with("SELECT * FROM v_ll_data_item "));
    }

    #[test]
    fn test_quote_cannot_break_out_of_literal() {
        let q = CatalogQuery::for_product(
            &DataProduct::new("X' OR '1'='1"),
            window(),
        )
        .unwrap();
        assert_eq!(
            q.adql(),
            "SELECT * FROM v_sc_data_item WHERE descriptor='X'' OR ''1''=''1'"
        );
    }

    #[test]
    fn test_invalid_descriptor_is_rejected() {
        let err = CatalogQuery::for_product(&DataProduct::new(""), window()).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Validation);
    }

    #[test]
    fn test_params_and_endpoint() {
        let q = CatalogQuery::for_product(&DataProduct::new("EUI-FSI174-IMAGE"), window()).unwrap();
        let params = q.params();
        assert_eq!(params[0], ("REQUEST", "doQuery"));
        assert_eq!(params[3].0, "QUERY");
        assert_eq!(params[3].1, q.adql());
        assert_eq!(
            CatalogQuery::endpoint("http://example.org/tap/"),
            "http://example.org/tap/sync"
        );
    }
}
