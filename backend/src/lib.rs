//! # SODA Availability
//!
//! Data availability engine for the Solar Orbiter archive.
//!
//! This crate answers "for which days does the archive hold data for this
//! product" without hammering the archive: each product is queried at most
//! once per calendar day and the answer is cached on disk.
//!
//! ## Features
//!
//! - **Remote Queries**: ADQL queries against the archive's TAP endpoint
//! - **Daily Cache**: one CSV entry per product per day, written atomically
//! - **Consolidation**: raw intervals folded into whole-day coverage ranges
//! - **Reports**: concurrent multi-product lookups with isolated failures
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`archive`]: TAP query building, response parsing and the HTTP client
//! - [`cache`]: cache store trait with on-disk and in-memory implementations
//! - [`services`]: interval store, consolidator, reports and timelines
//! - [`models`]: products, intervals and timestamp handling
//! - [`config`]: TOML and environment configuration
//!

// Allow large error types - FetchError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod archive;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::{FetchError, FetchErrorKind, FetchResult};
pub use models::{DataProduct, DataStream, DayRange, Interval};
pub use services::{coverage_for, intervals_for, IntervalStore};
