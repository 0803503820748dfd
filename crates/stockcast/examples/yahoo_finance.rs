//! Example: Fetching Real Market Data from Yahoo Finance
//!
//! This example demonstrates how to:
//! 1. Download a price history and cache it as CSV
//! 2. Reload the cached table
//! 3. Report missing values, returns risk and descriptive statistics
//!
//! Run with: `cargo run --example yahoo_finance -- MSFT`

use chrono::{Days, Utc};
use stockcast::{
    data::{LoaderConfig, YahooSource, check_missing_data, load_stock_data, read_csv},
    primitives::{DateRange, Symbol, columns},
    stats::{RiskConfig, add_daily_returns, column_values, descriptive_stats, risk_report},
};

/// Calendar days of history to fetch (~2 years).
const LOOKBACK_DAYS: u64 = 730;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("stockcast=info").init();

    let ticker = std::env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());
    let symbol = Symbol::new(&ticker);

    let end = Utc::now().date_naive();
    let start = end.checked_sub_days(Days::new(LOOKBACK_DAYS)).ok_or("date out of range")?;
    let range = DateRange::new(start, end).ok_or("empty date range")?;

    println!("=== {symbol} from {start} to {end} ===\n");

    let source = YahooSource::new()?;
    let config = LoaderConfig::default();
    let prices = load_stock_data(&source, &symbol, range, &config).await?;
    println!("{}\n", prices.tail(Some(5)));

    let cached = read_csv(config.save_dir.join(symbol.history_file_name()))?;
    println!("Cached table: {} rows, {} columns", cached.height(), cached.width());

    let missing = check_missing_data(&prices)?;
    if missing.is_empty() {
        println!("No missing values");
    }
    for m in &missing {
        println!("  {:<12} {} missing", m.column, m.missing);
    }

    let features = add_daily_returns(&prices)?;
    let returns = column_values(&features, columns::DAILY_RETURN)?;
    let risk = risk_report(&returns, &RiskConfig::from_confidence(0.99)?)?;
    println!("\n99% one-day VaR");
    println!("  historical   {:>8.4}", risk.historical_var);
    println!("  parametric   {:>8.4}", risk.parametric_var);
    println!("  monte carlo  {:>8.4}", risk.monte_carlo_var);
    println!("Sharpe ratio   {:>8.4}\n", risk.sharpe_ratio);

    println!("{}", descriptive_stats(&features, columns::CLOSE, columns::DAILY_RETURN)?);

    Ok(())
}
