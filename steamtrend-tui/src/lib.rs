//! steamtrend viewer: tier charts in a 2×2 ratatui grid.
//!
//! - `tier_chart` draws one tier on a log10 players axis
//! - `ui` lays out the grid or a zoomed tier plus the status bar
//! - `input` maps keys to view changes

pub mod app;
pub mod input;
pub mod theme;
pub mod tier_chart;
pub mod ui;

pub use app::{App, View};
pub use theme::Theme;
pub use tier_chart::TierChart;

#[cfg(test)]
mod test_helpers;
