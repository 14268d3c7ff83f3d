//! Interval types.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::time::end_of_day;

/// A raw `(start, end)` pair as returned by the archive.
///
/// `start <= end` is assumed but not enforced; inverted records are carried
/// through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whether the record has its bounds the wrong way round.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Widen to whole calendar days: start truncated to its date, end
    /// extended to the last instant of its date.
    pub fn to_day_range(&self) -> DayRange {
        DayRange::new(self.start.date(), self.end.date())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// A closed range of calendar days, `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days covered, counting both ends. Zero for inverted ranges.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(-1) + 1
    }

    /// Re-express as a timestamp interval spanning the whole days.
    pub fn to_interval(&self) -> Interval {
        Interval::new(self.start.and_time(NaiveTime::MIN), end_of_day(self.end))
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
