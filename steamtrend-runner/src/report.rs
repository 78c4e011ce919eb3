//! Report export: CSV tables, a JSON summary and a plain-text overview.
//!
//! Artifacts for one run land in `{out_dir}/dashboard_{timestamp}/`:
//! - `aligned.csv`: the full aligned table
//! - `tier_{top,second,third,fourth}.csv`: one table per tier
//! - `summary.json`: per-column summary and dataset hash

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use steamtrend_core::data::DataSource;
use steamtrend_core::{AlignedTable, AppId, Tier};

use crate::pipeline::Dashboard;

// ─── CSV export ─────────────────────────────────────────────────────

/// Export an aligned table as CSV.
///
/// Columns: month, then one per series label. Undefined cells are empty.
pub fn export_table_csv(table: &AlignedTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["month"];
    header.extend(table.labels());
    wtr.write_record(&header)?;

    for (row, date) in table.axis().iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        record.extend(
            table
                .columns()
                .iter()
                .map(|c| c.values[row].map(|v| format!("{v:.0}")).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Summary ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub label: String,
    pub tier: Option<Tier>,
    /// Value in the final row, if defined.
    pub last: Option<f64>,
    pub defined_months: usize,
    pub source: Option<DataSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub dataset_hash: String,
    pub months: usize,
    pub first_month: Option<NaiveDate>,
    pub last_month: Option<NaiveDate>,
    pub columns: Vec<ColumnSummary>,
    pub skipped: Vec<AppId>,
}

/// Summarize a dashboard, columns sorted by final value (highest first,
/// undefined last).
pub fn summarize(dashboard: &Dashboard) -> DashboardSummary {
    let table = &dashboard.table;
    let mut columns: Vec<ColumnSummary> = table
        .labels()
        .into_iter()
        .map(|label| ColumnSummary {
            label: label.to_string(),
            tier: dashboard.tiers.tier_of(label),
            last: table.last_value(label),
            defined_months: table.defined_count(label),
            source: dashboard.sources.get(label).copied(),
        })
        .collect();
    columns.sort_by(|a, b| {
        b.last
            .unwrap_or(f64::NEG_INFINITY)
            .total_cmp(&a.last.unwrap_or(f64::NEG_INFINITY))
    });

    DashboardSummary {
        dataset_hash: dashboard.dataset_hash.clone(),
        months: table.len(),
        first_month: table.axis().first().copied(),
        last_month: table.axis().last().copied(),
        columns,
        skipped: dashboard.skipped.clone(),
    }
}

/// Fixed-width overview for the terminal.
pub fn format_summary(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    let span = match (summary.first_month, summary.last_month) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => "no data".to_string(),
    };
    let _ = writeln!(out, "Months:  {} ({span})", summary.months);
    let _ = writeln!(out, "Series:  {}", summary.columns.len());
    let _ = writeln!(out, "Skipped: {}", summary.skipped.len());
    let _ = writeln!(out, "Hash:    {}", summary.dataset_hash);
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<40} {:>8} {:>12} {:>7}", "Game", "Tier", "Players", "Months");
    let _ = writeln!(out, "{}", "-".repeat(70));
    for c in &summary.columns {
        let tier = c.tier.map(|t| t.label()).unwrap_or("-");
        let last = c.last.map(|v| format!("{v:.0}")).unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:<40} {:>8} {:>12} {:>7}",
            truncate(&c.label, 40),
            tier,
            last,
            c.defined_months
        );
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for one dashboard run and return its directory.
pub fn save_report(dashboard: &Dashboard, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("dashboard_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    write_report(dashboard, &run_dir)?;
    Ok(run_dir)
}

/// Write the artifact set into `run_dir`, creating it if needed.
pub fn write_report(dashboard: &Dashboard, run_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(run_dir)
        .with_context(|| format!("failed to create report dir: {}", run_dir.display()))?;

    let aligned = export_table_csv(&dashboard.table)?;
    write_file(&run_dir.join("aligned.csv"), &aligned)?;

    for (tier, table) in dashboard.tiers.iter() {
        let csv = export_table_csv(table)?;
        write_file(&run_dir.join(format!("tier_{}.csv", tier.label())), &csv)?;
    }

    let summary = serde_json::to_string_pretty(&summarize(dashboard))
        .context("failed to serialize dashboard summary")?;
    write_file(&run_dir.join("summary.json"), &summary)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use steamtrend_core::{classify, SeriesColumn, TierThresholds};

    fn dashboard() -> Dashboard {
        let table = AlignedTable::new(
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            ],
            vec![
                SeriesColumn {
                    label: "Dota 2".into(),
                    values: vec![Some(400_000.0), Some(420_000.0)],
                },
                SeriesColumn {
                    label: "Niche".into(),
                    values: vec![Some(50.0), Some(40.0)],
                },
                SeriesColumn {
                    label: "Gone".into(),
                    values: vec![Some(9_000.0), None],
                },
            ],
        )
        .unwrap();
        let thresholds = TierThresholds::default();
        let tiers = classify(&table, &thresholds);
        Dashboard {
            dataset_hash: "abc".into(),
            sources: BTreeMap::from([("Dota 2".to_string(), DataSource::Cache)]),
            skipped: vec![440],
            table,
            tiers,
            thresholds,
        }
    }

    #[test]
    fn csv_has_month_column_and_empty_undefined_cells() {
        let csv = export_table_csv(&dashboard().table).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "month,Dota 2,Niche,Gone");
        assert_eq!(lines[1], "2024-01-31,400000,50,9000");
        assert_eq!(lines[2], "2024-02-29,420000,40,");
    }

    #[test]
    fn empty_table_exports_header_only() {
        let csv = export_table_csv(&AlignedTable::default()).unwrap();
        assert_eq!(csv, "month\n");
    }

    #[test]
    fn summary_orders_by_last_value() {
        let summary = summarize(&dashboard());
        let labels: Vec<&str> = summary.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Dota 2", "Niche", "Gone"]);
        assert_eq!(summary.columns[0].tier, Some(Tier::Top));
        assert_eq!(summary.columns[0].source, Some(DataSource::Cache));
        assert_eq!(summary.columns[1].tier, None);
        assert_eq!(summary.columns[2].last, None);
        assert_eq!(summary.months, 2);
    }

    #[test]
    fn format_summary_lists_every_column() {
        let text = format_summary(&summarize(&dashboard()));
        assert!(text.contains("Months:  2 (2024-01-31 .. 2024-02-29)"));
        assert!(text.contains("Dota 2"));
        assert!(text.contains("420000"));
        assert!(text.contains("Skipped: 1"));
    }

    #[test]
    fn truncates_long_labels() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn write_report_produces_all_files() {
        let dir = tempfile::tempdir().unwrap();
        write_report(&dashboard(), dir.path()).unwrap();

        for name in [
            "aligned.csv",
            "tier_top.csv",
            "tier_second.csv",
            "tier_third.csv",
            "tier_fourth.csv",
            "summary.json",
        ] {
            assert!(dir.path().join(name).is_file(), "{name} missing");
        }

        let top = std::fs::read_to_string(dir.path().join("tier_top.csv")).unwrap();
        assert!(top.starts_with("month,Dota 2\n"));

        let json = std::fs::read_to_string(dir.path().join("summary.json")).unwrap();
        let summary: DashboardSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary.dataset_hash, "abc");
        assert_eq!(summary.skipped, vec![440]);
    }

    #[test]
    fn save_report_creates_timestamped_dir() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = save_report(&dashboard(), dir.path()).unwrap();
        assert!(run_dir.starts_with(dir.path()));
        assert!(run_dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("dashboard_"));
        assert!(run_dir.join("aligned.csv").is_file());
    }
}
