//! CSV cache layer, one file per entity.
//!
//! Layout: `{cache_dir}/{stem}.csv` with a header row. Player history stems
//! are the raw app id; item stems are the form-urlencoded item name, which is
//! reversible and cannot collide.
//!
//! Entries are never refreshed: once a file exists it is returned verbatim.
//! Writes are atomic (write to `.csv.tmp`, rename into place). Unreadable files
//! count as misses.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::provider::{DataError, DataSource};
use crate::series::AppId;

/// File-name key for a cached entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    stem: String,
}

impl CacheKey {
    pub fn app(app_id: AppId) -> Self {
        Self {
            stem: app_id.to_string(),
        }
    }

    pub fn item(item_name: &str) -> Self {
        Self {
            stem: url::form_urlencoded::byte_serialize(item_name.as_bytes()).collect(),
        }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Recover the item name from an item key's stem.
    pub fn item_name(&self) -> Option<String> {
        url::form_urlencoded::parse(self.stem.as_bytes())
            .next()
            .map(|(name, _)| name.into_owned())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.stem)
    }
}

/// Rows for one key and where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<R> {
    pub key: CacheKey,
    pub path: PathBuf,
    pub rows: Vec<R>,
    pub source: DataSource,
}

impl<R> CacheEntry<R> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The CSV cache.
#[derive(Debug, Clone)]
pub struct CsvCache {
    cache_dir: PathBuf,
}

impl CsvCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", key.stem))
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Load every row for a key.
    pub fn load<R: DeserializeOwned>(&self, key: &CacheKey) -> Result<Vec<R>, DataError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(DataError::NoCachedData {
                key: key.to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| DataError::CacheError(format!("open {}: {e}", path.display())))?;
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<R>, _>>()
            .map_err(|e| DataError::CacheError(format!("read {}: {e}", path.display())))?;

        if rows.is_empty() {
            return Err(DataError::CacheError(format!(
                "{} has no rows",
                path.display()
            )));
        }
        Ok(rows)
    }

    /// Write rows for a key, replacing any existing file.
    pub fn write<R: Serialize>(&self, key: &CacheKey, rows: &[R]) -> Result<(), DataError> {
        if rows.is_empty() {
            return Err(DataError::CacheError("no rows to cache".into()));
        }

        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension("csv.tmp");

        let written = write_csv(&tmp_path, rows);
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheError(format!("atomic rename failed: {e}"))
        })
    }

    /// Return the cached rows for `key`, or fetch, persist and return them.
    ///
    /// An empty fetch is returned as-is and not persisted, so the next run
    /// asks again. A failed persist is logged; the fetched rows still return.
    pub fn get_or_fetch<R, F>(&self, key: &CacheKey, fetch: F) -> Result<CacheEntry<R>, DataError>
    where
        R: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<Vec<R>, DataError>,
    {
        let path = self.path_for(key);

        match self.load(key) {
            Ok(rows) => {
                return Ok(CacheEntry {
                    key: key.clone(),
                    path,
                    rows,
                    source: DataSource::Cache,
                })
            }
            Err(DataError::NoCachedData { .. }) => {}
            Err(e) => warn!(key = %key, error = %e, "ignoring unreadable cache file"),
        }

        let rows = fetch()?;
        if !rows.is_empty() {
            if let Err(e) = self.write(key, &rows) {
                warn!(key = %key, error = %e, "failed to persist cache entry");
            }
        }

        Ok(CacheEntry {
            key: key.clone(),
            path,
            rows,
            source: DataSource::Network,
        })
    }
}

fn write_csv<R: Serialize>(path: &Path, rows: &[R]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| DataError::CacheError(format!("create {}: {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| DataError::CacheError(format!("write {}: {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| DataError::CacheError(format!("flush {}: {e}", path.display())))
}
