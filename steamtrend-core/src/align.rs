//! Multi-entity monthly alignment.
//!
//! Pipeline, in order:
//! 1. outer-join every entity on the union of raw timestamps
//! 2. millisecond timestamps → UTC calendar time
//! 3. one row per calendar month, same-month values averaged
//! 4. linear interpolation strictly between defined cells (no edge fill)
//! 5. trailing simple moving average over `window` rows
//! 6. round defined cells to the nearest integer (player counts only)
//!
//! Entities with no usable points contribute no column.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::series::{AlignedTable, EntitySeries, SeriesColumn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignOptions {
    /// Moving-average window in monthly rows.
    pub window: usize,
    /// Round defined cells to whole numbers. Off for prices.
    pub round: bool,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            window: 5,
            round: true,
        }
    }
}

/// Align entity series onto a shared monthly axis.
///
/// Column order follows input order. Labels must be unique; a repeated label
/// keeps only its first series.
pub fn align_series(series: &[EntitySeries], opts: &AlignOptions) -> AlignedTable {
    let (timestamps, joined) = outer_join(series);
    let (axis, monthly) = resample_monthly(&timestamps, joined);

    let columns = monthly
        .into_iter()
        .map(|(label, values)| {
            let values = interpolate_interior(&values);
            let values = rolling_mean(&values, opts.window);
            let values = if opts.round { round_values(&values) } else { values };
            SeriesColumn { label, values }
        })
        .collect();

    // Built on `axis` with deduplicated labels, so already rectangular.
    AlignedTable { axis, columns }
}

/// Outer-join on the union of timestamps that chrono can represent.
///
/// Returns the sorted timestamp index and, per entity, one optional cell per
/// index entry. Several points at the same timestamp average together.
fn outer_join(series: &[EntitySeries]) -> (Vec<DateTime<Utc>>, Vec<(String, Vec<Option<f64>>)>) {
    let mut index = BTreeSet::new();
    let mut seen = BTreeSet::new();
    let mut kept = Vec::new();

    for entity in series {
        if !seen.insert(entity.label.as_str()) {
            warn!(label = %entity.label, "duplicate series label; keeping the first");
            continue;
        }

        let mut by_time: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
        for point in &entity.points {
            if DateTime::from_timestamp_millis(point.timestamp).is_none() {
                warn!(
                    label = %entity.label,
                    timestamp = point.timestamp,
                    "dropping unrepresentable timestamp"
                );
                continue;
            }
            if !point.value.is_finite() {
                continue;
            }
            let slot = by_time.entry(point.timestamp).or_insert((0.0, 0));
            slot.0 += point.value;
            slot.1 += 1;
        }

        if by_time.is_empty() {
            continue;
        }
        index.extend(by_time.keys().copied());
        kept.push((entity.label.clone(), by_time));
    }

    let index: Vec<i64> = index.into_iter().collect();
    let joined = kept
        .into_iter()
        .map(|(label, by_time)| {
            let cells = index
                .iter()
                .map(|ts| by_time.get(ts).map(|(sum, n)| sum / *n as f64))
                .collect();
            (label, cells)
        })
        .collect();

    let times = index
        .iter()
        .filter_map(|ts| DateTime::from_timestamp_millis(*ts))
        .collect();
    (times, joined)
}

/// Months since year 0, a contiguous key for calendar months.
fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Last calendar day of the month with the given ordinal.
fn month_end(ordinal: i64) -> NaiveDate {
    let year = ordinal.div_euclid(12) as i32;
    let month = ordinal.rem_euclid(12) as u32 + 1;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Bucket joined rows by calendar month and average each bucket.
///
/// The axis covers every month from the first to the last observed one;
/// months with no observation for a column are `None`.
fn resample_monthly(
    times: &[DateTime<Utc>],
    joined: Vec<(String, Vec<Option<f64>>)>,
) -> (Vec<NaiveDate>, Vec<(String, Vec<Option<f64>>)>) {
    let ordinals: Vec<i64> = times.iter().map(|t| month_ordinal(t.date_naive())).collect();
    let (Some(&first), Some(&last)) = (ordinals.first(), ordinals.last()) else {
        return (Vec::new(), Vec::new());
    };

    let rows = (last - first + 1) as usize;
    let axis = (first..=last).map(month_end).collect();

    let columns = joined
        .into_iter()
        .map(|(label, cells)| {
            let mut sums = vec![(0.0, 0usize); rows];
            for (ordinal, cell) in ordinals.iter().zip(cells) {
                if let Some(v) = cell {
                    let slot = &mut sums[(ordinal - first) as usize];
                    slot.0 += v;
                    slot.1 += 1;
                }
            }
            let values = sums
                .into_iter()
                .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
                .collect();
            (label, values)
        })
        .collect();

    (axis, columns)
}

/// Fill gaps bounded on both sides by defined cells, linearly in row index.
///
/// Leading and trailing gaps stay `None`.
pub fn interpolate_interior(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = values.to_vec();
    let mut previous: Option<(usize, f64)> = None;

    for (i, cell) in values.iter().enumerate() {
        let Some(v) = *cell else { continue };
        if let Some((j, u)) = previous {
            let span = (i - j) as f64;
            for (k, slot) in out.iter_mut().enumerate().take(i).skip(j + 1) {
                *slot = Some(u + (v - u) * (k - j) as f64 / span);
            }
        }
        previous = Some((i, v));
    }
    out
}

/// Trailing simple moving average. A row is defined only when the full
/// window ending at it is defined; the first `window - 1` rows never are.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            values[i + 1 - window..=i]
                .iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|sum| sum / window as f64)
        })
        .collect()
}

pub fn round_values(values: &[Option<f64>]) -> Vec<Option<f64>> {
    values.iter().map(|v| v.map(f64::round)).collect()
}
