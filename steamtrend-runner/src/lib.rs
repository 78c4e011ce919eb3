//! steamtrend runner: the orchestration above `steamtrend-core`.
//!
//! - Cache-backed player-history loading with provenance
//! - The dashboard pipeline (catalog → align → tiers) and its dataset hash
//! - Market price loading for listed items
//! - CSV/JSON report export

pub mod data_loader;
pub mod market;
pub mod pipeline;
pub mod report;

pub use data_loader::{game_labels, load_player_histories, LoadError, LoadedHistories};
pub use market::{load_item_prices, price_series, run_market_prices, LoadedPrices};
pub use pipeline::{build_dashboard, compute_dataset_hash, run_dashboard, Dashboard};
pub use report::{
    export_table_csv, format_summary, save_report, summarize, write_report, ColumnSummary,
    DashboardSummary,
};
