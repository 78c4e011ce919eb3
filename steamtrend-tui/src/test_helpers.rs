//! Test helpers for building dashboards without a network.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use steamtrend_core::{classify, AlignedTable, SeriesColumn, TierThresholds};
use steamtrend_runner::{compute_dataset_hash, Dashboard};

/// Twelve months, one column per tier plus one below every threshold.
pub fn sample_dashboard() -> Dashboard {
    let axis: Vec<NaiveDate> = (2..=13)
        .map(|m| {
            let (y, m) = if m > 12 { (2024, m - 12) } else { (2023, m) };
            NaiveDate::from_ymd_opt(y, m, 1).unwrap().pred_opt().unwrap()
        })
        .collect();

    let column = |label: &str, level: f64| SeriesColumn {
        label: label.to_string(),
        values: (0..12)
            .map(|i| (i >= 4).then(|| (level * (1.0 + i as f64 / 20.0)).round()))
            .collect(),
    };

    let table = AlignedTable::new(
        axis,
        vec![
            column("Dota 2", 600_000.0),
            column("Team Fortress 2", 60_000.0),
            column("Left 4 Dead 2", 6_000.0),
            column("Portal", 600.0),
            column("Ghost Town", 10.0),
        ],
    )
    .unwrap();

    let thresholds = TierThresholds::default();
    let tiers = classify(&table, &thresholds);
    Dashboard {
        dataset_hash: compute_dataset_hash(&table),
        sources: BTreeMap::new(),
        skipped: Vec::new(),
        table,
        tiers,
        thresholds,
    }
}
