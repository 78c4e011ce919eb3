//! Criterion benchmarks for the alignment path.
//!
//! 1. Full `align_series` over many games with staggered start dates
//! 2. Tier classification of an aligned table

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use steamtrend_core::{
    align_series, classify, AlignOptions, EntitySeries, TierThresholds, TimeSeriesPoint,
};

const DAY_MS: i64 = 86_400_000;
const START_MS: i64 = 1_262_304_000_000; // 2010-01-01

// ── Helpers ──────────────────────────────────────────────────────────

/// `games` series of daily points; game `g` starts `g * 30` days late.
fn make_series(games: usize, days: usize) -> Vec<EntitySeries> {
    (0..games)
        .map(|g| {
            let offset = (g * 30) as i64;
            let points = (0..days)
                .map(|d| {
                    let value = 1_000.0 * (g + 1) as f64 + (d as f64 * 0.05).sin() * 200.0;
                    TimeSeriesPoint::new(START_MS + (offset + d as i64) * DAY_MS, value)
                })
                .collect();
            EntitySeries::new(format!("game-{g}"), points)
        })
        .collect()
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align_series");
    for games in [10usize, 50, 168] {
        let series = make_series(games, 3_650);
        group.bench_with_input(BenchmarkId::from_parameter(games), &series, |b, series| {
            b.iter(|| align_series(black_box(series), &AlignOptions::default()))
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let table = align_series(&make_series(168, 3_650), &AlignOptions::default());
    let thresholds = TierThresholds::default();
    c.bench_function("classify_168", |b| {
        b.iter(|| classify(black_box(&table), &thresholds))
    });
}

criterion_group!(benches, bench_align, bench_classify);
criterion_main!(benches);
