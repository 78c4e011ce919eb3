//! One tier's aligned table as a log-scale line chart.
//!
//! ratatui axes are linear, so points are plotted as `(day, log10(players))`
//! and the y labels name the decades (`100`, `1k`, `10k`, ...). Cells that
//! are undefined or not positive have no log and are left out.

use chrono::{Datelike, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph, Widget},
};
use steamtrend_core::{AlignedTable, Tier, TierThresholds};

use crate::theme::Theme;

pub struct TierChart<'a> {
    tier: Tier,
    table: &'a AlignedTable,
    thresholds: &'a TierThresholds,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> TierChart<'a> {
    pub fn new(
        tier: Tier,
        table: &'a AlignedTable,
        thresholds: &'a TierThresholds,
        theme: &'a Theme,
    ) -> Self {
        Self {
            tier,
            table,
            thresholds,
            theme,
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

/// X coordinate of an axis date.
fn day_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Plottable `(day, log10(value))` points of one column.
pub fn log_points(axis: &[NaiveDate], values: &[Option<f64>]) -> Vec<(f64, f64)> {
    axis.iter()
        .zip(values)
        .filter_map(|(date, cell)| match cell {
            Some(v) if *v > 0.0 => Some((day_x(*date), v.log10())),
            _ => None,
        })
        .collect()
}

/// Whole-decade y bounds enclosing every point, at least one decade tall.
pub fn decade_bounds(points: &[(f64, f64)]) -> (i32, i32) {
    let lo = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return (0, 1);
    }
    let lo = lo.floor() as i32;
    let hi = (hi.ceil() as i32).max(lo + 1);
    (lo, hi)
}

/// `10^exp` with a metric suffix: 1, 10, 100, 1k, 10k, 100k, 1M, ...
pub fn decade_label(exp: i32) -> String {
    const SUFFIXES: [(i32, &str); 3] = [(9, "G"), (6, "M"), (3, "k")];
    if exp < 0 {
        return format!("1e{exp}");
    }
    for (step, suffix) in SUFFIXES {
        if exp >= step {
            return format!("{}{suffix}", 10u64.pow((exp - step) as u32));
        }
    }
    10u64.pow(exp as u32).to_string()
}

impl Widget for TierChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(
                format!(" {} [{}] ", self.tier.title(self.thresholds), self.table.column_count()),
                self.theme.title(),
            ))
            .borders(Borders::ALL)
            .border_style(self.theme.border(self.focused))
            .style(Style::default().bg(self.theme.background));

        let series: Vec<(&str, Vec<(f64, f64)>)> = self
            .table
            .columns()
            .iter()
            .map(|c| (c.label.as_str(), log_points(self.table.axis(), &c.values)))
            .filter(|(_, points)| !points.is_empty())
            .collect();

        if series.is_empty() {
            let notice = Span::styled(
                "No series in this tier",
                Style::default().fg(self.theme.warning),
            );
            Paragraph::new(notice)
                .alignment(Alignment::Center)
                .block(block)
                .render(area, buf);
            return;
        }

        let all_points: Vec<(f64, f64)> = series
            .iter()
            .flat_map(|(_, p)| p.iter().copied())
            .collect();
        let (y_lo, y_hi) = decade_bounds(&all_points);

        let axis = self.table.axis();
        let (first, last) = match (axis.first(), axis.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return,
        };
        let x_lo = day_x(first);
        let x_hi = day_x(last).max(x_lo + 1.0);
        let mid = axis[axis.len() / 2];

        let datasets: Vec<Dataset> = series
            .iter()
            .enumerate()
            .map(|(i, (label, points))| {
                Dataset::default()
                    .name(*label)
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.series_color(i)))
                    .data(points)
            })
            .collect();

        let x_labels = [first, mid, last]
            .iter()
            .map(|d| Span::raw(d.format("%Y-%m-%d").to_string()))
            .collect::<Vec<_>>();
        let y_labels = (y_lo..=y_hi)
            .map(|exp| Span::raw(decade_label(exp)))
            .collect::<Vec<_>>();

        Chart::new(datasets)
            .block(block)
            .legend_position(Some(LegendPosition::TopLeft))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
            .x_axis(
                Axis::default()
                    .title(Span::styled("Date", self.theme.axis_title()))
                    .style(self.theme.axis())
                    .bounds([x_lo, x_hi])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled("Players", self.theme.axis_title()))
                    .style(self.theme.axis())
                    .bounds([f64::from(y_lo), f64::from(y_hi)])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steamtrend_core::SeriesColumn;

    fn month_end(y: i32, m: u32) -> NaiveDate {
        let (ny, nm) = if m == 12 { (y + 1, 1) } else { (y, m + 1) };
        NaiveDate::from_ymd_opt(ny, nm, 1).unwrap().pred_opt().unwrap()
    }

    fn sample_table() -> AlignedTable {
        let axis: Vec<NaiveDate> = (1..=12).map(|m| month_end(2023, m)).collect();
        let rising = (0..12)
            .map(|i| if i < 4 { None } else { Some(1_000.0 * (i + 1) as f64) })
            .collect();
        let flat = (0..12).map(|i| if i < 4 { None } else { Some(5_500.0) }).collect();
        AlignedTable::new(
            axis,
            vec![
                SeriesColumn {
                    label: "Rising".into(),
                    values: rising,
                },
                SeriesColumn {
                    label: "Flat".into(),
                    values: flat,
                },
            ],
        )
        .unwrap()
    }

    fn render_to_string(chart: TierChart, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        chart.render(area, &mut buf);
        let mut content = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                content.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            content.push('\n');
        }
        content
    }

    #[test]
    fn test_log_points_skip_undefined_and_nonpositive() {
        let axis = vec![month_end(2024, 1), month_end(2024, 2), month_end(2024, 3)];
        let points = log_points(&axis, &[None, Some(0.0), Some(1_000.0)]);
        assert_eq!(points.len(), 1);
        assert!((points[0].1 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_decade_bounds() {
        assert_eq!(decade_bounds(&[(0.0, 3.2), (1.0, 4.7)]), (3, 5));
        assert_eq!(decade_bounds(&[(0.0, 4.0)]), (4, 5));
        assert_eq!(decade_bounds(&[]), (0, 1));
    }

    #[test]
    fn test_decade_labels() {
        assert_eq!(decade_label(0), "1");
        assert_eq!(decade_label(2), "100");
        assert_eq!(decade_label(3), "1k");
        assert_eq!(decade_label(5), "100k");
        assert_eq!(decade_label(6), "1M");
    }

    #[test]
    fn test_tier_chart_renders_title_axes_and_legend() {
        let table = sample_table();
        let thresholds = TierThresholds::default();
        let theme = Theme::default();
        let chart = TierChart::new(Tier::Third, &table, &thresholds, &theme).focused(true);

        let content = render_to_string(chart, 100, 30);
        assert!(content.contains("Players 1000 - 10000 [2]"));
        assert!(content.contains("Players"));
        assert!(content.contains("Date"));
        assert!(content.contains("2023-01-31"));
        assert!(content.contains("Rising"));
        assert!(content.contains("Flat"));
        assert!(content.contains("10k"));
    }

    #[test]
    fn test_empty_tier_renders_notice() {
        let table = sample_table().select(&[]);
        let thresholds = TierThresholds::default();
        let theme = Theme::default();
        let chart = TierChart::new(Tier::Top, &table, &thresholds, &theme);

        let content = render_to_string(chart, 60, 10);
        assert!(content.contains("No series in this tier"));
    }

    #[test]
    fn test_tiny_area_renders_without_panic() {
        let table = sample_table();
        let thresholds = TierThresholds::default();
        let theme = Theme::default();
        let chart = TierChart::new(Tier::Second, &table, &thresholds, &theme);
        render_to_string(chart, 6, 3);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn decade_bounds_enclose_every_point(
                values in proptest::collection::vec(1.0f64..1e7, 1..50),
            ) {
                let points: Vec<(f64, f64)> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i as f64, v.log10()))
                    .collect();
                let (lo, hi) = decade_bounds(&points);
                prop_assert!(hi > lo);
                for (_, y) in &points {
                    prop_assert!(f64::from(lo) <= *y && *y <= f64::from(hi));
                }
            }

            #[test]
            fn log_points_keep_only_positive_cells(
                cells in proptest::collection::vec(proptest::option::of(-10.0f64..1e6), 0..24),
            ) {
                let axis: Vec<NaiveDate> = (0..cells.len())
                    .map(|i| month_end(2020 + (i / 12) as i32, (i % 12) as u32 + 1))
                    .collect();
                let points = log_points(&axis, &cells);
                let positive = cells.iter().flatten().filter(|v| **v > 0.0).count();
                prop_assert_eq!(points.len(), positive);
                prop_assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
            }
        }
    }
}
