//! Stock analysis and forecasting CLI tool.
//!
//! Downloads a price history, derives returns and risk statistics, tests
//! stationarity, selects and fits a SARIMA model on a training window and
//! scores its forecast on the held-out days.
//!
//! Usage: `cargo run --features cli --bin analyze -- TICKER --start DATE --end DATE`
//! Example: `cargo run --features cli --bin analyze -- AAPL --start 2020-01-01 --end 2024-12-31 --split-date 2024-06-30 --plots`
//!
//! Log verbosity follows `RUST_LOG`, for example `RUST_LOG=stockcast_model=debug`
//! to trace the order search.

mod config;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use config::AnalysisConfig;
use polars::prelude::DataFrame;
use report::{AnalysisReport, ModelSummary, OutlierCounts};
use stockcast::{
    data::{LoaderConfig, YahooSource, check_missing_data, load_stock_data, save_to_csv},
    model::{
        business_days_after, date_index, forecast_accuracy, generate_forecast, split_time_series,
        train_auto_arima,
    },
    primitives::{Date, DateRange, Symbol, columns, from_epoch_days},
    stats::{
        add_daily_returns, add_rolling_stats, adf_test, column_values, descriptive_stats,
        detect_outliers_iqr, detect_outliers_zscore, risk_report,
    },
    viz::{
        plot_closing_price, plot_daily_returns, plot_returns_and_volatility,
        plot_returns_distribution,
    },
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Analyze and forecast one stock.
#[derive(Debug, Parser)]
#[command(name = "analyze", version, about)]
struct Cli {
    /// Ticker symbol, e.g. AAPL.
    ticker: String,

    /// First date of the history (YYYY-MM-DD).
    #[arg(long)]
    start: Date,

    /// Last date of the history (YYYY-MM-DD).
    #[arg(long)]
    end: Date,

    /// Last training date; defaults to the configured share of rows.
    #[arg(long)]
    split_date: Option<Date>,

    /// Consider seasonal model terms.
    #[arg(long)]
    seasonal: bool,

    /// Season length in trading days.
    #[arg(long, default_value_t = 5)]
    period: usize,

    /// TOML file with analysis settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the price cache, forecast and report.
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Render SVG charts into `<out-dir>/plots`.
    #[arg(long)]
    plots: bool,

    /// Forecast steps when no days follow the split date.
    #[arg(long)]
    horizon: Option<usize>,

    /// Two-sided tail probability of the forecast intervals.
    #[arg(long)]
    alpha: Option<f64>,
}

impl Cli {
    /// Settings from the config file with command-line overrides applied.
    fn settings(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };
        if self.config.is_none() {
            config.loader = LoaderConfig::with_save_dir(self.out_dir.join("raw"));
        }
        if self.seasonal {
            config.search.seasonal = true;
            config.search.period = self.period;
        }
        if let Some(horizon) = self.horizon {
            config.forecast.horizon = horizon;
        }
        if let Some(alpha) = self.alpha {
            config.forecast.alpha = alpha;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "stockcast=info,analyze=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.settings()?;

    let report = run(&cli, &config).await?;
    println!("\n{report}");

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;
    let report_path = cli.out_dir.join("report.json");
    std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("writing {}", report_path.display()))?;
    info!(path = %report_path.display(), "report saved");

    Ok(())
}

/// Run the full pipeline for one ticker.
async fn run(cli: &Cli, config: &AnalysisConfig) -> anyhow::Result<AnalysisReport> {
    let symbol = Symbol::new(&cli.ticker);
    let range = DateRange::new(cli.start, cli.end)
        .with_context(|| format!("end date {} precedes start date {}", cli.end, cli.start))?;

    let source = YahooSource::new()?;
    let prices = load_stock_data(&source, &symbol, range, &config.loader).await?;
    let missing = check_missing_data(&prices)?;

    let features = add_daily_returns(&prices)?;
    let features = add_rolling_stats(&features, &config.rolling_windows, columns::DAILY_RETURN)?;

    let outliers = OutlierCounts {
        iqr: detect_outliers_iqr(&features, columns::DAILY_RETURN, config.iqr_factor)?.height(),
        zscore: detect_outliers_zscore(&features, columns::DAILY_RETURN, config.zscore_threshold)?
            .height(),
    };

    let returns = column_values(&features, columns::DAILY_RETURN)?;
    let risk = risk_report(&returns, &config.risk)?;
    let descriptive = descriptive_stats(&features, columns::CLOSE, columns::DAILY_RETURN)?;
    let closes = column_values(&features, columns::CLOSE)?;
    let stationarity = adf_test(&closes, &format!("{symbol} Close"))?;

    let split_date = match cli.split_date {
        Some(date) => date,
        None => default_split_date(&features, config.train_fraction)?,
    };
    let split = split_time_series(&features, split_date)?;
    if split.train.height() == 0 {
        bail!("no training rows on or before {split_date}");
    }

    let (fit, search) = train_auto_arima(&split.train, columns::CLOSE, &config.search)?;

    let index = forecast_index(&split.train, &split.test, config.forecast.horizon)?;
    let forecast = generate_forecast(&fit, index.len(), &index, config.forecast.alpha)?;

    let accuracy = if split.test.height() == 0 {
        None
    } else {
        let actual = column_values(&split.test, columns::CLOSE)?;
        let predicted = column_values(&forecast, columns::FORECAST)?;
        if actual.len() == predicted.len() {
            Some(forecast_accuracy(&actual, &predicted)?)
        } else {
            warn!(
                actual = actual.len(),
                predicted = predicted.len(),
                "held-out closes contain gaps, forecast not scored"
            );
            None
        }
    };

    save_to_csv(&forecast, &format!("{symbol}_forecast.csv"), &cli.out_dir)?;

    if cli.plots {
        let var = Some(risk.historical_var);
        render_plots(&features, symbol.as_str(), var, config, &cli.out_dir.join("plots"))?;
    }

    Ok(AnalysisReport {
        symbol: symbol.to_string(),
        start: cli.start,
        end: cli.end,
        rows: prices.height(),
        missing,
        outliers,
        risk,
        descriptive,
        stationarity,
        split_date,
        train_rows: split.train.height(),
        test_rows: split.test.height(),
        model: ModelSummary::new(&fit, &search),
        accuracy,
    })
}

/// Date of the last training row when `fraction` of rows are used for training.
fn default_split_date(df: &DataFrame, fraction: f64) -> anyhow::Result<Date> {
    if fraction.is_nan() || fraction <= 0.0 || fraction > 1.0 {
        bail!("train_fraction must be in (0, 1], got {fraction}");
    }
    let days = date_index(df)?;
    let n_train = ((days.len() as f64 * fraction).round() as usize).clamp(1, days.len().max(1));
    let day = days.get(n_train - 1).copied().context("price table is empty")?;
    from_epoch_days(day).context("split date out of range")
}

/// Dates the forecast is labelled with: the held-out trading days, or the
/// `horizon` weekdays after training when nothing is held out.
fn forecast_index(train: &DataFrame, test: &DataFrame, horizon: usize) -> anyhow::Result<Vec<Date>> {
    if test.height() > 0 {
        return date_index(test)?
            .into_iter()
            .map(from_epoch_days)
            .collect::<Option<Vec<_>>>()
            .context("test dates out of range");
    }
    let last = date_index(train)?
        .last()
        .copied()
        .and_then(from_epoch_days)
        .context("training partition has no dates")?;
    info!(horizon, %last, "no held-out rows, forecasting past the training data");
    Ok(business_days_after(last, horizon))
}

fn render_plots(
    features: &DataFrame,
    label: &str,
    var: Option<f64>,
    config: &AnalysisConfig,
    dir: &Path,
) -> anyhow::Result<()> {
    let chart = &config.chart;
    let window = config.rolling_windows.first().copied().unwrap_or(7);

    plot_closing_price(features, label, chart, Some(&dir.join(format!("{label}_close.svg"))))?;
    plot_daily_returns(features, label, chart, Some(&dir.join(format!("{label}_returns.svg"))))?;
    plot_returns_and_volatility(
        features,
        label,
        window,
        chart,
        Some(&dir.join(format!("{label}_volatility.svg"))),
    )?;
    plot_returns_distribution(
        features,
        label,
        var,
        chart,
        Some(&dir.join(format!("{label}_distribution.svg"))),
    )?;
    info!(dir = %dir.display(), "charts rendered");
    Ok(())
}
