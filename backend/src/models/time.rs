//! Timestamp conventions shared by the archive client and the cache.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Earliest instant used as the lower bound of a full-history query.
pub const MISSION_EPOCH: &str = "2020-01-01T00:00:00";

/// Format accepted by the archive for query bounds: second precision, `+`
/// between date and time.
pub const QUERY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d+%H:%M:%S";

/// Format of timestamps written to cache entries.
pub const CACHE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Default mission epoch as a timestamp.
pub fn mission_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

/// Format a timestamp for the archive query (sub-second part dropped).
pub fn format_query_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(QUERY_TIMESTAMP_FORMAT).to_string()
}

/// Format a timestamp for a cache entry.
pub fn format_cache_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(CACHE_TIMESTAMP_FORMAT).to_string()
}

/// Parse an absolute timestamp as found in archive responses and cache files.
///
/// Accepts a space or `T` separator, optional fractional seconds, an optional
/// trailing `Z`, and bare dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Last representable instant of `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    date.and_time(last)
}
