//! Parsing of TAP JSON responses.
//!
//! A response names its columns in `metadata` and carries positional rows in
//! `data`. Column order is resolved by name on every response.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ErrorContext, FetchError, FetchResult};
use crate::models::time::parse_timestamp;
use crate::models::Interval;

pub const BEGIN_COLUMN: &str = "begin_time";
pub const END_COLUMN: &str = "end_time";

/// One `metadata` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
}

/// Raw TAP response body. Both sections are required; only an explicit
/// empty `data` array means zero rows.
#[derive(Debug, Clone, Deserialize)]
pub struct TapResponse {
    pub metadata: Vec<ColumnMetadata>,
    pub data: Vec<Vec<Value>>,
}

/// Positions of the interval columns within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalColumns {
    pub begin: usize,
    pub end: usize,
}

impl IntervalColumns {
    /// Resolve the interval columns from `metadata`.
    ///
    /// # Errors
    /// `ProtocolError` naming the first missing column.
    pub fn resolve(metadata: &[ColumnMetadata]) -> FetchResult<Self> {
        let find = |name: &str| {
            metadata.iter().position(|c| c.name == name).ok_or_else(|| {
                FetchError::protocol_with_context(
                    format!("response has no '{}' column", name),
                    ErrorContext::new("parse_response").with_details(format!(
                        "columns={}",
                        metadata
                            .iter()
                            .map(|c| c.name.as_str())
                            .collect::<Vec<_>>()
                            .join(",")
                    )),
                )
            })
        };
        Ok(Self {
            begin: find(BEGIN_COLUMN)?,
            end: find(END_COLUMN)?,
        })
    }
}

impl TapResponse {
    /// Extract one interval per row, in row order.
    pub fn intervals(&self) -> FetchResult<Vec<Interval>> {
        let columns = IntervalColumns::resolve(&self.metadata)?;
        self.data
            .iter()
            .enumerate()
            .map(|(idx, row)| -> FetchResult<Interval> {
                let start = timestamp_cell(row, columns.begin, idx, BEGIN_COLUMN)?;
                let end = timestamp_cell(row, columns.end, idx, END_COLUMN)?;
                Ok(Interval::new(start, end))
            })
            .collect()
    }
}

fn timestamp_cell(
    row: &[Value],
    col: usize,
    row_idx: usize,
    name: &str,
) -> FetchResult<chrono::NaiveDateTime> {
    let context = || ErrorContext::new("parse_response").with_details(format!("row={}", row_idx));
    let cell = row.get(col).ok_or_else(|| {
        FetchError::protocol_with_context(
            format!("row has {} cells, '{}' expected at {}", row.len(), name, col),
            context(),
        )
    })?;
    let raw = cell.as_str().ok_or_else(|| {
        FetchError::protocol_with_context(
            format!("'{}' is not a string: {}", name, cell),
            context(),
        )
    })?;
    parse_timestamp(raw).ok_or_else(|| {
        FetchError::protocol_with_context(
            format!("'{}' is not a timestamp: {:?}", name, raw),
            context(),
        )
    })
}

/// Parse a response body into raw intervals.
///
/// Zero data rows is a valid, empty answer.
pub fn parse_response(body: &str) -> FetchResult<Vec<Interval>> {
    let de = &mut serde_json::Deserializer::from_str(body);
    let response: TapResponse = serde_path_to_error::deserialize(de).map_err(|e| {
        FetchError::protocol_with_context(
            format!("invalid response body: {}", e.inner()),
            ErrorContext::new("parse_response").with_details(format!("path={}", e.path())),
        )
    })?;
    response.intervals()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use chrono::NaiveDateTime;

    fn t(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn test_parse_rows_in_order() {
        let body = r#"{
            "metadata": [
                {"name": "data_item_id", "datatype": "char"},
                {"name": "begin_time", "datatype": "char"},
                {"name": "end_time", "datatype": "char"}
            ],
            "data": [
                ["b", "2021-01-02 00:00:00.000", "2021-01-02 23:59:59.999"],
                ["a", "2021-01-01 00:00:00.000", "2021-01-01 12:00:00.000"]
            ]
        }"#;
        let intervals = parse_response(body).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start, t("2021-01-02 00:00:00.000"));
        assert_eq!(intervals[1].end, t("2021-01-01 12:00:00.000"));
    }

    #[test]
    fn test_columns_resolved_by_name() {
        let body = r#"{
            "metadata": [{"name": "end_time"}, {"name": "descriptor"}, {"name": "begin_time"}],
            "data": [["2021-01-03 00:00:00", "mag-rtn-normal", "2021-01-01 00:00:00"]]
        }"#;
        let intervals = parse_response(body).unwrap();
        assert_eq!(intervals[0].start, t("2021-01-01 00:00:00.0"));
        assert_eq!(intervals[0].end, t("2021-01-03 00:00:00.0"));
    }

    #[test]
    fn test_zero_rows_is_success() {
        let body = r#"{"metadata": [{"name": "begin_time"}, {"name": "end_time"}], "data": []}"#;
        assert!(parse_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_missing_data_section_is_protocol_error() {
        let body = r#"{"metadata": [{"name": "begin_time"}, {"name": "end_time"}]}"#;
        let err = parse_response(body).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Protocol);
        assert!(err.to_string().contains("data"));
    }

    #[test]
    fn test_missing_column_is_protocol_error() {
        let body = r#"{"metadata": [{"name": "begin_time"}], "data": []}"#;
        let err = parse_response(body).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Protocol);
        assert!(err.to_string().contains("end_time"));
    }

    #[test]
    fn test_invalid_json_is_protocol_error() {
        let err = parse_response("<html>maintenance</html>").unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Protocol);
    }

    #[test]
    fn test_wrong_shape_reports_path() {
        let err = parse_response(r#"{"metadata": [{"title": "x"}], "data": []}"#).unwrap_err();
        assert!(err.to_string().contains("metadata"));
    }

    #[test]
    fn test_null_cell_is_protocol_error() {
        let body = r#"{
            "metadata": [{"name": "begin_time"}, {"name": "end_time"}],
            "data": [["2021-01-01 00:00:00", null]]
        }"#;
        let err = parse_response(body).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Protocol);
    }

    #[test]
    fn test_short_row_is_protocol_error() {
        let body = r#"{
            "metadata": [{"name": "begin_time"}, {"name": "end_time"}],
            "data": [["2021-01-01 00:00:00"]]
        }"#;
        assert_eq!(parse_response(body).unwrap_err().kind(), FetchErrorKind::Protocol);
    }

    #[test]
    fn test_inverted_rows_pass_through() {
        let body = r#"{
            "metadata": [{"name": "begin_time"}, {"name": "end_time"}],
            "data": [["2021-01-05 00:00:00", "2021-01-03 00:00:00"]]
        }"#;
        let intervals = parse_response(body).unwrap();
        assert!(intervals[0].is_inverted());
    }
}
