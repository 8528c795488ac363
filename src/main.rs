// =============================================================================
// Breakout Screener — Main Entry Point
// =============================================================================
//
// Screens a watchlist of stocks for resistance/MA breakouts and volume
// spikes using daily Yahoo Finance data.  Modes: full screen, signals-only,
// market analysis, top opportunities, plus a connectivity health check.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod config;
mod display;
mod indicators;
mod screener;
mod signals;
mod types;
mod yahoo;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ScreenerConfig;
use crate::screener::Screener;
use crate::types::Period;
use crate::yahoo::YahooClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Mode {
    /// Screen every symbol and print the full report.
    Screen,
    /// Print only symbols that produced a signal.
    SignalsOnly,
    /// Aggregate a market-condition read from the batch.
    MarketAnalysis,
    /// Rank and print the best opportunities.
    TopOpportunities,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Screen => "screen",
            Self::SignalsOnly => "signals-only",
            Self::MarketAnalysis => "market-analysis",
            Self::TopOpportunities => "top-opportunities",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "breakout-screener",
    about = "Detect breakout patterns and volume spikes in stock data"
)]
struct Cli {
    /// Stock symbols to screen (default: popular tech stocks).
    #[arg(short, long, num_args = 1..)]
    symbols: Option<Vec<String>>,

    /// Time period for analysis.
    #[arg(short, long, value_enum)]
    period: Option<Period>,

    /// Volume spike threshold multiplier.
    #[arg(short = 'v', long)]
    volume_threshold: Option<f64>,

    /// Breakout threshold as a fraction (0.02 = 2%).
    #[arg(short = 'b', long)]
    breakout_threshold: Option<f64>,

    /// Operating mode.
    #[arg(short, long, value_enum, default_value_t = Mode::Screen)]
    mode: Mode,

    /// Result limit in top-opportunities mode.
    #[arg(short, long, default_value_t = 5)]
    limit: usize,

    /// Maximum concurrent symbol fetches.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Path to a JSON config file.
    #[arg(short, long, default_value = "screener_config.json")]
    config: String,

    /// Persist the effective configuration back to the config file.
    #[arg(long)]
    save_config: bool,

    /// Minimal output.
    #[arg(short, long)]
    quiet: bool,

    /// Verbose debug output.
    #[arg(long)]
    verbose: bool,

    /// Run a connectivity health check and exit.
    #[arg(long)]
    health_check: bool,
}

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    // ── 1. Logging ───────────────────────────────────────────────────────
    let default_level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if !cli.quiet {
        display::print_welcome();
    }

    // ── 2. Configuration ─────────────────────────────────────────────────
    let mut config = ScreenerConfig::load(&cli.config).unwrap_or_else(|e| {
        warn!(path = %cli.config, error = %e, "failed to load config, using defaults");
        ScreenerConfig::default()
    });

    if let Some(period) = cli.period {
        config.period = period;
    }
    if let Some(threshold) = cli.volume_threshold {
        config.volume_spike_threshold = threshold;
    }
    if let Some(threshold) = cli.breakout_threshold {
        config.breakout_threshold = threshold;
    }
    if let Some(concurrency) = cli.concurrency {
        config.max_concurrent_fetches = concurrency;
    }

    if cli.save_config {
        if let Err(e) = config.validate().and_then(|_| config.save(&cli.config)) {
            error!(path = %cli.config, error = %e, "failed to save config");
            display::print_error(&format!("Could not save configuration: {e}"));
            return 1;
        }
    }

    let symbols = cli.symbols.clone().unwrap_or_else(|| config.symbols.clone());

    // ── 3. Build the screener ────────────────────────────────────────────
    let gateway = YahooClient::new();

    // ── 4. Health check mode ─────────────────────────────────────────────
    if cli.health_check {
        info!("running system health check");
        let gateway_ok = gateway.test_connection().await;
        display::print_health_status(gateway_ok);
        return if gateway_ok { 0 } else { 1 };
    }

    let screener = match Screener::new(config, gateway) {
        Ok(screener) => screener,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            display::print_error(&format!("Invalid configuration: {e}"));
            return 1;
        }
    };

    if !cli.quiet {
        println!(
            "Screening {} stocks for breakouts and volume spikes...",
            symbols.len()
        );
    }

    // ── 5. Dispatch on mode ──────────────────────────────────────────────
    let started = std::time::Instant::now();

    match cli.mode {
        Mode::Screen => {
            let results = screener.screen_many(&symbols).await;
            display::print_screening_results(&results);
        }
        Mode::SignalsOnly => {
            let results = screener.stocks_with_signals(&symbols).await;
            if results.signal_count() > 0 {
                display::print_screening_results(&results);
            } else {
                display::print_info("No signals detected in current screening.");
            }
        }
        Mode::MarketAnalysis => {
            let analysis = screener.analyze_market_conditions(&symbols).await;
            display::print_market_analysis(&analysis);
        }
        Mode::TopOpportunities => {
            let opportunities = screener.top_opportunities(&symbols, cli.limit).await;
            display::print_top_opportunities(&opportunities, cli.limit);
        }
    }

    info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        "screening completed"
    );
    0
}
