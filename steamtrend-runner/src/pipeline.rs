//! End-to-end dashboard run: catalog → histories → aligned table → tiers.

use std::collections::BTreeMap;

use steamtrend_core::data::{Catalog, CsvCache, DataSource, DownloadProgress, SteamSource};
use steamtrend_core::{
    align_series, classify, AlignedTable, AppId, TierTables, TierThresholds, TrackerConfig,
};
use tracing::info;

use crate::data_loader::{load_player_histories, LoadError};

/// Everything the viewer and the report need from one run.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub table: AlignedTable,
    pub tiers: TierTables,
    pub thresholds: TierThresholds,
    /// BLAKE3 over the aligned table, stable across runs with the same cache.
    pub dataset_hash: String,
    pub sources: BTreeMap<String, DataSource>,
    pub skipped: Vec<AppId>,
}

/// Run the player-count dashboard for every configured game.
///
/// The catalog is fetched once here and only lives for this call.
pub fn run_dashboard(
    config: &TrackerConfig,
    source: &dyn SteamSource,
    progress: Option<&dyn DownloadProgress>,
) -> Result<Dashboard, LoadError> {
    let catalog = source.fetch_catalog()?;
    info!(source = source.name(), apps = catalog.len(), "catalog loaded");

    build_dashboard(config, &catalog, source, progress)
}

/// Same as [`run_dashboard`] with a caller-supplied catalog.
pub fn build_dashboard(
    config: &TrackerConfig,
    catalog: &Catalog,
    source: &dyn SteamSource,
    progress: Option<&dyn DownloadProgress>,
) -> Result<Dashboard, LoadError> {
    let cache = CsvCache::new(&config.cache.player_history);
    let loaded = load_player_histories(&config.games, catalog, &cache, source, progress)?;

    let table = align_series(&loaded.series, &config.align);
    let tiers = classify(&table, &config.tiers);
    let dataset_hash = compute_dataset_hash(&table);

    info!(
        columns = table.column_count(),
        months = table.len(),
        tiered = tiers.total_columns(),
        skipped = loaded.skipped.len(),
        "dashboard built"
    );

    Ok(Dashboard {
        table,
        tiers,
        thresholds: config.tiers.clone(),
        dataset_hash,
        sources: loaded.sources,
        skipped: loaded.skipped,
    })
}

/// Deterministic BLAKE3 hash over axis, labels and cell values.
///
/// Undefined cells hash differently from every defined value.
pub fn compute_dataset_hash(table: &AlignedTable) -> String {
    let mut hasher = blake3::Hasher::new();

    for date in table.axis() {
        hasher.update(date.to_string().as_bytes());
    }
    for column in table.columns() {
        hasher.update(column.label.as_bytes());
        hasher.update(&[0]);
        for cell in &column.values {
            match cell {
                Some(v) => {
                    hasher.update(&[1]);
                    hasher.update(&v.to_le_bytes());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}
