//! On-disk cache store.
//!
//! Layout:
//!
//! ```text
//! <root>/
//!   science/
//!     MAG-RTN-NORMAL_2021-06-01.csv
//!   low_latency/
//!     SWA-PAS-MOM_2021-06-01.csv
//! ```
//!
//! Each file holds a `Start,End` header and one row per interval. Files are
//! written to a temporary name in the same directory and persisted over the
//! final name, so a reader never sees half an entry.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{ErrorContext, FetchError, FetchResult};
use crate::models::time::{format_cache_timestamp, parse_timestamp};
use crate::models::{DataProduct, Interval};

use super::CacheStore;

const DATE_FORMAT: &str = "%Y-%m-%d";
const EXTENSION: &str = "csv";

#[derive(Debug, Serialize, Deserialize)]
struct CacheRow {
    #[serde(rename = "Start")]
    start: String,
    #[serde(rename = "End")]
    end: String,
}

/// Cache entries stored as CSV files below a root directory.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    root: PathBuf,
}

impl FileCacheStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the entries of `product`'s stream.
    pub fn stream_dir(&self, product: &DataProduct) -> PathBuf {
        self.root.join(product.stream().as_str())
    }

    /// Path of the entry for `product` on `date`.
    pub fn entry_path(&self, product: &DataProduct, date: NaiveDate) -> PathBuf {
        self.stream_dir(product).join(format!(
            "{}_{}.{}",
            file_stem(product.descriptor()),
            date.format(DATE_FORMAT),
            EXTENSION
        ))
    }
}

/// Encode a descriptor as a file name component.
///
/// Bytes outside `[A-Za-z0-9_-]` become `%XX`, which keeps path separators
/// and `..` out of file names.
pub fn file_stem(descriptor: &str) -> String {
    let mut stem = String::with_capacity(descriptor.len());
    for b in descriptor.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            stem.push(b as char);
        } else {
            stem.push_str(&format!("%{:02X}", b));
        }
    }
    stem
}

fn io_error(operation: &str, path: &Path, err: impl std::fmt::Display) -> FetchError {
    FetchError::cache_with_context(
        err.to_string(),
        ErrorContext::new(operation).with_details(path.display().to_string()),
    )
}

fn read_entry(path: &Path) -> FetchResult<Option<Vec<Interval>>> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error("cache_read", path, e)),
    };

    let mut reader = csv::Reader::from_reader(file);
    let mut intervals = Vec::new();
    for (idx, row) in reader.deserialize::<CacheRow>().enumerate() {
        let row = row.map_err(|e| io_error("cache_read", path, e))?;
        let start = parse_timestamp(&row.start);
        let end = parse_timestamp(&row.end);
        match (start, end) {
            (Some(start), Some(end)) => intervals.push(Interval::new(start, end)),
            _ => {
                return Err(io_error(
                    "cache_read",
                    path,
                    format!("row {} has an unparsable timestamp", idx + 1),
                ))
            }
        }
    }
    Ok(Some(intervals))
}

fn write_entry(path: &Path, intervals: &[Interval]) -> FetchResult<()> {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir).map_err(|e| io_error("cache_write", &dir, e))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| io_error("cache_write", &dir, e))?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        if intervals.is_empty() {
            writer
                .write_record(["Start", "End"])
                .map_err(|e| io_error("cache_write", path, e))?;
        }
        for interval in intervals {
            writer
                .serialize(CacheRow {
                    start: format_cache_timestamp(&interval.start),
                    end: format_cache_timestamp(&interval.end),
                })
                .map_err(|e| io_error("cache_write", path, e))?;
        }
        writer.flush().map_err(|e| io_error("cache_write", path, e))?;
    }
    tmp.as_file_mut()
        .flush()
        .map_err(|e| io_error("cache_write", path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| io_error("cache_write", path, e))?;
    tmp.persist(path)
        .map_err(|e| io_error("cache_write", path, e.error))?;
    Ok(())
}

fn list_dates(dir: &Path, stem: &str) -> FetchResult<Vec<NaiveDate>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error("cache_list", dir, e)),
    };

    let prefix = format!("{}_", stem);
    let suffix = format!(".{}", EXTENSION);
    let mut dates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error("cache_list", dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let date = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(&suffix))
            .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok());
        if let Some(date) = date {
            dates.push(date);
        }
    }
    dates.sort();
    Ok(dates)
}

fn remove_entry(path: &Path) -> FetchResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_error("cache_remove", path, e)),
    }
}

/// Run blocking filesystem work off the async executor.
async fn blocking<T, F>(f: F) -> FetchResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> FetchResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| FetchError::cache(format!("cache task failed: {}", e)))?
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn read(
        &self,
        product: &DataProduct,
        date: NaiveDate,
    ) -> FetchResult<Option<Vec<Interval>>> {
        let path = self.entry_path(product, date);
        debug!("Reading cache entry {}", path.display());
        blocking(move || read_entry(&path))
            .await
            .map_err(|e| e.with_product(product))
    }

    async fn write(
        &self,
        product: &DataProduct,
        date: NaiveDate,
        intervals: &[Interval],
    ) -> FetchResult<()> {
        let path = self.entry_path(product, date);
        let intervals = intervals.to_vec();
        blocking(move || write_entry(&path, &intervals))
            .await
            .map_err(|e| e.with_product(product))
    }

    async fn entry_dates(&self, product: &DataProduct) -> FetchResult<Vec<NaiveDate>> {
        let dir = self.stream_dir(product);
        let stem = file_stem(product.descriptor());
        blocking(move || list_dates(&dir, &stem))
            .await
            .map_err(|e| e.with_product(product))
    }

    async fn remove(&self, product: &DataProduct, date: NaiveDate) -> FetchResult<bool> {
        let path = self.entry_path(product, date);
        blocking(move || remove_entry(&path))
            .await
            .map_err(|e| e.with_product(product))
    }
}
