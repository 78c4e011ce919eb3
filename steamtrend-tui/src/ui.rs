//! Top-level layout: chart area plus a one-line status bar.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use steamtrend_core::Tier;

use crate::app::{App, View};
use crate::tier_chart::TierChart;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    match app.view {
        View::Grid => draw_grid(f, chunks[0], app),
        View::Zoom(tier) => draw_tier(f, chunks[0], app, tier, true),
    }

    let status = Paragraph::new(app.status_line())
        .style(Style::default().fg(app.theme.text_secondary).bg(app.theme.background));
    f.render_widget(status, chunks[1]);
}

/// Four charts, tiers in reading order.
fn draw_grid(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (row, pair) in rows.iter().zip(Tier::ALL.chunks(2)) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row);
        for (cell, tier) in cells.iter().zip(pair) {
            draw_tier(f, *cell, app, *tier, false);
        }
    }
}

fn draw_tier(f: &mut Frame, area: Rect, app: &App, tier: Tier, focused: bool) {
    let dashboard = &app.dashboard;
    let chart = TierChart::new(
        tier,
        dashboard.tiers.get(tier),
        &dashboard.thresholds,
        &app.theme,
    )
    .focused(focused);
    f.render_widget(chart, area);
}
