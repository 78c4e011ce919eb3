//! Player-history loading for the runner.
//!
//! Given a list of games, resolves each one through the CSV cache and falls
//! back to the source on a miss. Games are loaded one at a time, in order.
//!
//! Fallback policy per game:
//! 1. Cached file exists and parses → use it
//! 2. Otherwise fetch; a non-empty result is cached and used
//! 3. An empty result skips the game (no column, nothing cached)
//!
//! A payload the source cannot parse aborts the whole load.

use std::collections::{BTreeMap, HashMap, HashSet};

use steamtrend_core::data::{
    CacheKey, Catalog, CsvCache, DataError, DataSource, DownloadProgress, LoadOutcome, SteamSource,
};
use steamtrend_core::{AppId, EntitySeries, TimeSeriesPoint};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load '{key}': {source}")]
    Entity {
        key: String,
        #[source]
        source: DataError,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Result of loading histories, with provenance.
#[derive(Debug, Default)]
pub struct LoadedHistories {
    /// One series per game that produced points, in input order.
    pub series: Vec<EntitySeries>,
    /// Data source per series label.
    pub sources: BTreeMap<String, DataSource>,
    /// Games that produced no points.
    pub skipped: Vec<AppId>,
}

impl LoadedHistories {
    pub fn loaded(&self) -> usize {
        self.series.len()
    }
}

/// Display labels for `games`, one per id, in order.
///
/// Catalog names are used where known, the id otherwise. Names shared by more
/// than one game get ` ({id})` appended so every label is unique.
pub fn game_labels(games: &[AppId], catalog: &Catalog) -> Vec<String> {
    let names: Vec<String> = games.iter().map(|&id| catalog.label(id)).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    games
        .iter()
        .zip(&names)
        .map(|(id, name)| {
            if counts[name.as_str()] > 1 && *name != id.to_string() {
                format!("{name} ({id})")
            } else {
                name.clone()
            }
        })
        .collect()
}

/// Load player histories for `games`, cache first.
pub fn load_player_histories(
    games: &[AppId],
    catalog: &Catalog,
    cache: &CsvCache,
    source: &dyn SteamSource,
    progress: Option<&dyn DownloadProgress>,
) -> Result<LoadedHistories, LoadError> {
    let games = dedup_games(games);
    let labels = game_labels(&games, catalog);
    let total = games.len();
    let mut loaded = LoadedHistories::default();

    for (i, (&app_id, label)) in games.iter().zip(labels).enumerate() {
        if let Some(p) = progress {
            p.on_start(&label, i, total);
        }

        let key = CacheKey::app(app_id);
        let entry = cache
            .get_or_fetch::<TimeSeriesPoint, _>(&key, || source.fetch_player_history(app_id))
            .map_err(|e| LoadError::Entity {
                key: label.clone(),
                source: e,
            })?;

        if entry.is_empty() {
            debug!(app_id, label = %label, "no player history; skipping");
            if let Some(p) = progress {
                p.on_complete(&label, i, total, LoadOutcome::Empty);
            }
            loaded.skipped.push(app_id);
            continue;
        }

        if let Some(p) = progress {
            p.on_complete(
                &label,
                i,
                total,
                LoadOutcome::Loaded {
                    source: entry.source,
                    points: entry.rows.len(),
                },
            );
        }
        loaded.sources.insert(label.clone(), entry.source);
        loaded.series.push(EntitySeries::new(label, entry.rows));
    }

    if let Some(p) = progress {
        p.on_batch_complete(loaded.loaded(), loaded.skipped.len(), total);
    }

    Ok(loaded)
}

fn dedup_games(games: &[AppId]) -> Vec<AppId> {
    let mut seen = HashSet::new();
    games
        .iter()
        .copied()
        .filter(|id| {
            let fresh = seen.insert(*id);
            if !fresh {
                warn!(app_id = id, "game listed twice; loading once");
            }
            fresh
        })
        .collect()
}
