//! Viewer state.

use steamtrend_core::Tier;
use steamtrend_runner::Dashboard;

use crate::theme::Theme;

/// What the chart area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// All four tiers in a 2×2 grid.
    Grid,
    /// One tier filling the chart area.
    Zoom(Tier),
}

pub struct App {
    pub dashboard: Dashboard,
    pub view: View,
    pub theme: Theme,
    pub running: bool,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            view: View::Grid,
            theme: Theme::default(),
            running: true,
        }
    }

    pub fn zoom(&mut self, tier: Tier) {
        self.view = View::Zoom(tier);
    }

    pub fn show_grid(&mut self) {
        self.view = View::Grid;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// One-line status: series per tier and what the keys do.
    pub fn status_line(&self) -> String {
        let counts = self
            .dashboard
            .tiers
            .iter()
            .map(|(tier, table)| format!("{}:{}", tier.label(), table.column_count()))
            .collect::<Vec<_>>()
            .join(" ");
        let months = self.dashboard.table.len();
        format!(" {months} months | {counts} | 1-4 zoom  0/Esc grid  q quit ")
    }
}
