//! Remote sources and the local cache

pub mod cache;
pub mod catalog;
pub mod client;
pub mod market;
pub mod provider;
pub mod steamcharts;

pub use cache::{CacheEntry, CacheKey, CsvCache};
pub use catalog::Catalog;
pub use client::SteamClient;
pub use market::parse_price_history;
pub use provider::{
    DataError, DataSource, DownloadProgress, LoadOutcome, MarketItem, SilentProgress, SteamSource,
    StdoutProgress,
};
