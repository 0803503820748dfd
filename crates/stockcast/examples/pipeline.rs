//! Example: End-to-End Pipeline on Synthetic Prices
//!
//! This example demonstrates the complete stockcast workflow without network
//! access:
//! 1. Simulating a geometric random walk with a weekly pattern
//! 2. Deriving returns, rolling volatility and outliers
//! 3. Computing Value-at-Risk and the Sharpe ratio
//! 4. Testing stationarity
//! 5. Searching SARIMA orders on a training window and forecasting the rest
//!
//! Run with: `cargo run --example pipeline`

use polars::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use stockcast::{
    model::{
        AutoArimaConfig, business_days_after, date_index, forecast_accuracy, generate_forecast,
        split_time_series, train_auto_arima,
    },
    primitives::{Date, columns, from_epoch_days},
    stats::{
        RiskConfig, add_daily_returns, add_rolling_stats, adf_test, column_values,
        descriptive_stats, detect_outliers_iqr, risk_report,
    },
    viz::{ChartConfig, plot_returns_distribution},
};

/// Trading days to simulate (~1 year).
const TRADING_DAYS: usize = 252;

/// Trading days held out for scoring the forecast.
const HOLDOUT: usize = 20;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("stockcast=info").init();

    println!("=== stockcast pipeline on synthetic data ===\n");

    let prices = simulate_prices(TRADING_DAYS, 7)?;
    println!("{}\n", prices.head(Some(5)));

    // =========================================================================
    // DERIVED FEATURES AND RISK
    // =========================================================================

    let features = add_daily_returns(&prices)?;
    let features = add_rolling_stats(&features, &[5, 20], columns::DAILY_RETURN)?;
    let outliers = detect_outliers_iqr(&features, columns::DAILY_RETURN, 1.5)?;
    println!("IQR outliers: {}", outliers.height());

    let returns = column_values(&features, columns::DAILY_RETURN)?;
    let risk = risk_report(&returns, &RiskConfig::default())?;
    println!("95% one-day VaR");
    println!("  historical   {:>8.4}", risk.historical_var);
    println!("  parametric   {:>8.4}", risk.parametric_var);
    println!("  monte carlo  {:>8.4}", risk.monte_carlo_var);
    println!("Sharpe ratio   {:>8.4}\n", risk.sharpe_ratio);

    println!("{}", descriptive_stats(&features, columns::CLOSE, columns::DAILY_RETURN)?);

    let closes = column_values(&features, columns::CLOSE)?;
    let adf = adf_test(&closes, "synthetic Close")?;
    println!("ADF statistic {:.4}, p-value {:.4}\n", adf.statistic, adf.p_value);

    // =========================================================================
    // FORECAST
    // =========================================================================

    let days = date_index(&features)?;
    let split_day = days[TRADING_DAYS - HOLDOUT - 1];
    let split_date = from_epoch_days(split_day).ok_or("split date out of range")?;
    let split = split_time_series(&features, split_date)?;

    let config = AutoArimaConfig { max_p: 2, max_q: 2, ..AutoArimaConfig::seasonal(5) };
    let (fit, search) = train_auto_arima(&split.train, columns::CLOSE, &config)?;
    println!(
        "Selected {} ({} {:.2}) after {} candidates",
        fit.spec(),
        search.criterion,
        search.score,
        search.candidates.len()
    );

    let index = business_days_after(split_date, HOLDOUT);
    let forecast = generate_forecast(&fit, HOLDOUT, &index, 0.05)?;
    println!("{}\n", forecast.head(Some(5)));

    let actual = column_values(&split.test, columns::CLOSE)?;
    let predicted = column_values(&forecast, columns::FORECAST)?;
    let accuracy = forecast_accuracy(&actual, &predicted)?;
    println!(
        "Hold-out accuracy: MAE {:.4}, RMSE {:.4}, MAPE {:.2}%",
        accuracy.mae, accuracy.rmse, accuracy.mape
    );

    let svg = plot_returns_distribution(
        &features,
        "Synthetic",
        Some(risk.historical_var),
        &ChartConfig::default(),
        None,
    )?;
    println!("Rendered return histogram ({} bytes of SVG)", svg.len());

    Ok(())
}

/// Geometric random walk starting at 100 with a small weekday effect,
/// one row per weekday from 2024-01-01.
fn simulate_prices(n: usize, seed: u64) -> PolarsResult<DataFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0005, 0.012).expect("valid normal parameters");

    let start = Date::from_ymd_opt(2023, 12, 31).expect("valid date");
    let dates = business_days_after(start, n);

    let mut close = Vec::with_capacity(n);
    let mut level = 100.0_f64;
    for t in 0..n {
        let weekday_effect = [0.002, -0.001, 0.0, -0.001, 0.0][t % 5];
        level *= 1.0 + noise.sample(&mut rng) + weekday_effect;
        close.push(level);
    }
    let open: Vec<f64> = close.iter().map(|c| c * 0.998).collect();
    let high: Vec<f64> = close.iter().map(|c| c * 1.006).collect();
    let low: Vec<f64> = close.iter().map(|c| c * 0.992).collect();
    let volume: Vec<u64> = (0..n as u64).map(|t| 1_000_000 + (t * 7919) % 250_000).collect();

    df! {
        columns::DATE => dates,
        columns::OPEN => open,
        columns::HIGH => high,
        columns::LOW => low,
        columns::CLOSE => close.clone(),
        columns::ADJ_CLOSE => close,
        columns::VOLUME => volume,
    }
}
