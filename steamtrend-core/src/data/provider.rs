//! Data source trait and structured error types.
//!
//! The `SteamSource` trait abstracts over the remote endpoints so the runner
//! can be driven by the live `SteamClient` or by a test double. The cache layer
//! sits above this trait; sources don't know about the cache.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::Catalog;
use crate::series::{AppId, TimeSeriesPoint};

/// Structured error types for data operations.
///
/// Non-200 responses are not errors: sources log them and return an empty
/// result. These variants cover payloads that cannot be understood and local
/// cache failures.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("no cached data for '{key}'")]
    NoCachedData { key: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Where a series came from on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Cache,
    Network,
}

/// A marketplace item as listed by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketItem {
    pub name: String,
    /// Lowest sell price in currency units (the endpoint reports cents).
    pub price: f64,
    pub listing_count: u64,
}

/// The remote endpoints this tool reads from.
pub trait SteamSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Monthly-ish player counts for a game. Empty when the endpoint refuses.
    fn fetch_player_history(&self, app_id: AppId) -> Result<Vec<TimeSeriesPoint>, DataError>;

    /// Raw embedded price-history literal from an item's listing page.
    ///
    /// `None` when the page could not be fetched.
    fn fetch_item_price_history(
        &self,
        item_name: &str,
        app_id: AppId,
    ) -> Result<Option<String>, DataError>;

    /// Full application catalog. Empty when the endpoint refuses.
    fn fetch_catalog(&self) -> Result<Catalog, DataError>;

    /// Every marketplace item for a game keyed by hash name.
    fn fetch_all_items_for_game(
        &self,
        app_id: AppId,
    ) -> Result<BTreeMap<String, MarketItem>, DataError>;
}

/// Progress callback for multi-entity loads.
pub trait DownloadProgress {
    /// Called when starting to load an entity.
    fn on_start(&self, key: &str, index: usize, total: usize);

    /// Called when an entity load completes.
    fn on_complete(&self, key: &str, index: usize, total: usize, outcome: LoadOutcome);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, loaded: usize, skipped: usize, total: usize);
}

/// Per-entity result reported to `DownloadProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { source: DataSource, points: usize },
    Empty,
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, key: &str, index: usize, total: usize) {
        println!("[{}/{}] Loading {key}...", index + 1, total);
    }

    fn on_complete(&self, key: &str, _index: usize, _total: usize, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Loaded {
                source: DataSource::Cache,
                points,
            } => println!("  cached: {key} ({points} points)"),
            LoadOutcome::Loaded {
                source: DataSource::Network,
                points,
            } => println!("  fetched: {key} ({points} points)"),
            LoadOutcome::Empty => println!("  empty: {key}"),
        }
    }

    fn on_batch_complete(&self, loaded: usize, skipped: usize, total: usize) {
        println!("\nLoad complete: {loaded}/{total} loaded, {skipped} empty");
    }
}

/// Progress reporter that discards everything.
pub struct SilentProgress;

impl DownloadProgress for SilentProgress {
    fn on_start(&self, _key: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _key: &str, _index: usize, _total: usize, _outcome: LoadOutcome) {}
    fn on_batch_complete(&self, _loaded: usize, _skipped: usize, _total: usize) {}
}
