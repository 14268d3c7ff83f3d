//! Interval consolidation for day-resolution display.
//!
//! Raw archive intervals are widened to whole calendar days and folded into
//! the minimal set of disjoint closed day ranges. Ranges that overlap or
//! touch (the next starts the day after the previous ends) are merged.

use chrono::NaiveDate;

use crate::models::{DayRange, Interval};

/// Consolidate raw intervals into disjoint, non-adjacent day ranges.
///
/// Output is sorted by start day. Inverted intervals are not rejected; they
/// flow through as inverted ranges.
pub fn consolidate(intervals: &[Interval]) -> Vec<DayRange> {
    let mut sorted = intervals.to_vec();
    // stable: ties keep archive order
    sorted.sort_by_key(|i| i.start);

    let mut merged: Vec<DayRange> = Vec::new();
    for range in sorted.iter().map(Interval::to_day_range) {
        match merged.last_mut() {
            Some(last) if range.start <= day_after(last.end) => {
                if range.end > last.end {
                    last.end = range.end;
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Total number of days covered by consolidated ranges.
pub fn covered_days(coverage: &[DayRange]) -> i64 {
    coverage.iter().map(DayRange::days).sum()
}

fn day_after(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(NaiveDate::MAX)
}
