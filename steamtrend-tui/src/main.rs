//! steamtrend: player-count tiers for a fixed list of Steam games.
//!
//! Takes no arguments. One run:
//! 1. Loads `steamtrend.toml` from the working directory, or the defaults
//! 2. Fetches the catalog and every game's history through the CSV cache
//! 3. Aligns monthly, smooths, classifies into four tiers
//! 4. Prints a summary and writes a report under `reports/`
//! 5. Opens the chart viewer when stdout is a terminal

use std::io::{self, stdout, IsTerminal};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use steamtrend_core::data::{SteamClient, StdoutProgress};
use steamtrend_core::TrackerConfig;
use steamtrend_runner::{format_summary, run_dashboard, save_report, summarize, Dashboard};
use steamtrend_tui::{input, ui, App};

const CONFIG_FILE: &str = "steamtrend.toml";
const DEFAULT_LOG_FILTER: &str = "warn,steamtrend=info,steamtrend_core=info,steamtrend_runner=info";

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = TrackerConfig::load_or_default(Path::new(CONFIG_FILE))
        .with_context(|| format!("failed to load {CONFIG_FILE}"))?;
    info!(games = config.games.len(), "configuration loaded");

    let client = SteamClient::from_config(&config).context("failed to build HTTP client")?;
    let dashboard =
        run_dashboard(&config, &client, Some(&StdoutProgress)).context("dashboard run failed")?;

    println!();
    print!("{}", format_summary(&summarize(&dashboard)));

    let report_dir = save_report(&dashboard, &config.report_dir)?;
    println!("\nReport written to {}", report_dir.display());

    if stdout().is_terminal() {
        run_viewer(dashboard)?;
    }
    Ok(())
}

fn run_viewer(dashboard: Dashboard) -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(dashboard);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }
    }
    Ok(())
}
