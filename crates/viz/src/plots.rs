//! The four presentation charts.

use std::path::Path;

use plotters::style::RGBColor;
use polars::prelude::DataFrame;
use stockcast_primitives::columns;
use stockcast_stats::{add_rolling_stats, column_values};

use crate::{
    ChartConfig, VizError,
    render::{Line, dated_values, histogram_chart, line_chart, persist},
};

const PRICE_COLOR: RGBColor = RGBColor(31, 119, 180);
const RETURN_COLOR: RGBColor = RGBColor(255, 127, 14);
const VOLATILITY_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Chart the `Close` column over time.
///
/// # Arguments
/// * `df` - Table with a `date` column of dtype `Date` and a `Close` column
/// * `label` - Ticker or series name used in the title
/// * `out` - Optional path receiving the SVG document
///
/// # Returns
/// The SVG document.
///
/// # Errors
/// Returns `MissingColumn` or `EmptyData` for unusable input, `Render` if
/// drawing fails and `Io` if the file cannot be written.
pub fn plot_closing_price(
    df: &DataFrame,
    label: &str,
    config: &ChartConfig,
    out: Option<&Path>,
) -> Result<String, VizError> {
    let line = Line {
        label: "Closing Price".to_string(),
        color: PRICE_COLOR,
        points: dated_values(df, columns::CLOSE)?,
    };
    let svg = line_chart(&format!("{label} Closing Price Over Time"), "Price", &[line], config)?;
    persist(svg, out)
}

/// Chart the `daily_return` column over time.
///
/// # Errors
/// Same as [`plot_closing_price`].
pub fn plot_daily_returns(
    df: &DataFrame,
    label: &str,
    config: &ChartConfig,
    out: Option<&Path>,
) -> Result<String, VizError> {
    let line = Line {
        label: "Daily Returns".to_string(),
        color: RETURN_COLOR,
        points: dated_values(df, columns::DAILY_RETURN)?,
    };
    let svg =
        line_chart(&format!("{label} Daily Returns Over Time"), "Daily Return", &[line], config)?;
    persist(svg, out)
}

/// Chart daily returns together with their `window`-day rolling standard
/// deviation.
///
/// The `rolling_std_{window}d` column is computed when the table does not
/// already carry it.
///
/// # Errors
/// Same as [`plot_closing_price`], plus statistics errors for an invalid
/// window.
pub fn plot_returns_and_volatility(
    df: &DataFrame,
    label: &str,
    window: usize,
    config: &ChartConfig,
    out: Option<&Path>,
) -> Result<String, VizError> {
    let std_column = columns::rolling_std(window);
    let owned;
    let table = if df.column(&std_column).is_ok() {
        df
    } else {
        owned = add_rolling_stats(df, &[window], columns::DAILY_RETURN)?;
        &owned
    };

    let lines = [
        Line {
            label: "Daily Return".to_string(),
            color: RETURN_COLOR,
            points: dated_values(table, columns::DAILY_RETURN)?,
        },
        Line {
            label: format!("{window}-Day Rolling Volatility"),
            color: VOLATILITY_COLOR,
            points: dated_values(table, &std_column)?,
        },
    ];
    let title = format!("{label} Daily Returns and {window}-Day Rolling Volatility");
    let svg = line_chart(&title, "Value", &lines, config)?;
    persist(svg, out)
}

/// Histogram of `daily_return` with an optional Value-at-Risk marker.
///
/// `var` is a positive loss; the marker is drawn at the return `-var`.
///
/// # Errors
/// Same as [`plot_closing_price`].
pub fn plot_returns_distribution(
    df: &DataFrame,
    label: &str,
    var: Option<f64>,
    config: &ChartConfig,
    out: Option<&Path>,
) -> Result<String, VizError> {
    let returns = column_values(df, columns::DAILY_RETURN)
        .map_err(|_| VizError::MissingColumn(columns::DAILY_RETURN.to_string()))?;
    if returns.is_empty() {
        return Err(VizError::EmptyData(columns::DAILY_RETURN.to_string()));
    }
    let marker = var.filter(|v| v.is_finite()).map(|v| (format!("VaR {v:.4}"), -v));
    let svg = histogram_chart(
        &format!("{label} Distribution of Daily Returns"),
        &returns,
        marker,
        config,
    )?;
    persist(svg, out)
}
