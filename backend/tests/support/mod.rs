#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use soda_availability::archive::{IntervalSource, QueryWindow};
use soda_availability::cache::CacheStore;
use soda_availability::{DataProduct, FetchError, FetchResult, Interval};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Archive stand-in that counts calls and can be switched offline.
pub struct StubSource {
    calls: AtomicUsize,
    offline: AtomicBool,
    intervals: Vec<Interval>,
}

impl StubSource {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
            intervals,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl IntervalSource for StubSource {
    async fn fetch(
        &self,
        _product: &DataProduct,
        _window: &QueryWindow,
    ) -> FetchResult<Vec<Interval>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // let concurrent callers interleave
        tokio::task::yield_now().await;
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::network("connection refused"));
        }
        Ok(self.intervals.clone())
    }
}

/// Cache whose reads and writes always fail.
pub struct BrokenCache {
    pub fail_reads: bool,
    pub fail_writes: bool,
}

#[async_trait]
impl CacheStore for BrokenCache {
    async fn read(
        &self,
        _product: &DataProduct,
        _date: NaiveDate,
    ) -> FetchResult<Option<Vec<Interval>>> {
        if self.fail_reads {
            return Err(FetchError::cache("corrupt entry"));
        }
        Ok(None)
    }

    async fn write(
        &self,
        _product: &DataProduct,
        _date: NaiveDate,
        _intervals: &[Interval],
    ) -> FetchResult<()> {
        if self.fail_writes {
            return Err(FetchError::cache("disk full"));
        }
        Ok(())
    }

    async fn entry_dates(&self, _product: &DataProduct) -> FetchResult<Vec<NaiveDate>> {
        Ok(Vec::new())
    }

    async fn remove(&self, _product: &DataProduct, _date: NaiveDate) -> FetchResult<bool> {
        Ok(false)
    }
}
