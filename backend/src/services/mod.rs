//! Service layer for lookup and consolidation.
//!
//! This module sits between the archive client and cache on one side and
//! report or rendering code on the other. The store decides when the archive
//! is queried; the remaining services shape its output.

pub mod availability;

pub mod consolidate;

pub mod interval_store;

pub mod timeline;

pub use availability::{
    build_report, coverage_for, coverage_for_product, intervals_for, intervals_for_product,
    AvailabilityReport, ProductAvailability, ProductCoverage,
};
pub use consolidate::{consolidate, covered_days};
pub use interval_store::{IntervalOrigin, IntervalStore, StoreSettings};
pub use timeline::{Instrument, Timeline, TimelineRow};
