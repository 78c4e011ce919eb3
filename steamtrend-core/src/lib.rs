//! steamtrend core: domain types, Steam data sources, CSV cache, monthly
//! alignment and tier classification.
//!
//! Data flows one way:
//! - `data` fetches player and market histories and caches them as CSV
//! - `align` puts every entity on one monthly axis and smooths it
//! - `tiers` buckets the aligned columns by their final value
//!
//! `config` carries the game list, endpoints and thresholds.

pub mod align;
pub mod config;
pub mod data;
pub mod series;
pub mod tiers;

pub use align::{align_series, AlignOptions};
pub use config::{ConfigError, TrackerConfig};
pub use series::{AlignedTable, AppId, EntitySeries, PricePoint, SeriesColumn, TimeSeriesPoint};
pub use tiers::{classify, Tier, TierTables, TierThresholds};
