//! Market price histories.
//!
//! The cache holds parsed `PricePoint` rows per item, so the embedded
//! listing-page literal is only decoded once. Items whose page could not be
//! fetched are skipped and retried on the next run.

use std::collections::BTreeMap;

use steamtrend_core::data::{
    parse_price_history, CacheKey, CsvCache, DataSource, DownloadProgress, LoadOutcome, MarketItem,
    SteamSource,
};
use steamtrend_core::{
    align_series, AlignOptions, AlignedTable, AppId, EntitySeries, PricePoint, TimeSeriesPoint,
    TrackerConfig,
};

use crate::data_loader::LoadError;

#[derive(Debug, Default)]
pub struct LoadedPrices {
    /// Price rows per item name, for items that produced any.
    pub histories: BTreeMap<String, Vec<PricePoint>>,
    pub sources: BTreeMap<String, DataSource>,
    pub skipped: Vec<String>,
}

/// Load price histories for `items` of one game, cache first.
pub fn load_item_prices(
    items: &[&str],
    app_id: AppId,
    cache: &CsvCache,
    source: &dyn SteamSource,
    progress: Option<&dyn DownloadProgress>,
) -> Result<LoadedPrices, LoadError> {
    let total = items.len();
    let mut loaded = LoadedPrices::default();

    for (i, &item) in items.iter().enumerate() {
        if let Some(p) = progress {
            p.on_start(item, i, total);
        }

        let entry = cache
            .get_or_fetch::<PricePoint, _>(&CacheKey::item(item), || {
                match source.fetch_item_price_history(item, app_id)? {
                    Some(raw) => parse_price_history(&raw),
                    None => Ok(Vec::new()),
                }
            })
            .map_err(|e| LoadError::Entity {
                key: item.to_string(),
                source: e,
            })?;

        if entry.is_empty() {
            if let Some(p) = progress {
                p.on_complete(item, i, total, LoadOutcome::Empty);
            }
            loaded.skipped.push(item.to_string());
            continue;
        }

        if let Some(p) = progress {
            p.on_complete(
                item,
                i,
                total,
                LoadOutcome::Loaded {
                    source: entry.source,
                    points: entry.rows.len(),
                },
            );
        }
        loaded.sources.insert(item.to_string(), entry.source);
        loaded.histories.insert(item.to_string(), entry.rows);
    }

    if let Some(p) = progress {
        p.on_batch_complete(loaded.histories.len(), loaded.skipped.len(), total);
    }

    Ok(loaded)
}

/// Adapt price histories into series of median prices for alignment.
pub fn price_series(histories: &BTreeMap<String, Vec<PricePoint>>) -> Vec<EntitySeries> {
    histories
        .iter()
        .map(|(name, rows)| {
            let points = rows
                .iter()
                .map(|row| TimeSeriesPoint::new(row.timestamp, row.price))
                .collect();
            EntitySeries::new(name.clone(), points)
        })
        .collect()
}

/// Monthly aligned prices for every listed item of a game.
///
/// Returns the listing snapshot alongside the table. An empty listing (for
/// instance after a failed search page) gives an empty table. Prices keep
/// their cents: the configured window applies but rounding does not.
pub fn run_market_prices(
    config: &TrackerConfig,
    app_id: AppId,
    source: &dyn SteamSource,
    progress: Option<&dyn DownloadProgress>,
) -> Result<(BTreeMap<String, MarketItem>, AlignedTable), LoadError> {
    let items = source.fetch_all_items_for_game(app_id)?;
    let names: Vec<&str> = items.keys().map(String::as_str).collect();

    let cache = CsvCache::new(&config.cache.item_price_history);
    let loaded = load_item_prices(&names, app_id, &cache, source, progress)?;
    let opts = AlignOptions {
        round: false,
        ..config.align.clone()
    };
    let table = align_series(&price_series(&loaded.histories), &opts);

    Ok((items, table))
}
