//! Column names shared by price, feature and forecast tables.

/// Date index column.
pub const DATE: &str = "date";
/// Opening price.
pub const OPEN: &str = "Open";
/// Intraday high.
pub const HIGH: &str = "High";
/// Intraday low.
pub const LOW: &str = "Low";
/// Closing price.
pub const CLOSE: &str = "Close";
/// Dividend and split adjusted close.
pub const ADJ_CLOSE: &str = "Adj Close";
/// Traded volume.
pub const VOLUME: &str = "Volume";
/// Close-to-close percentage change.
pub const DAILY_RETURN: &str = "daily_return";
/// Point forecast.
pub const FORECAST: &str = "forecast";
/// Lower confidence bound.
pub const LOWER_CI: &str = "lower_ci";
/// Upper confidence bound.
pub const UPPER_CI: &str = "upper_ci";

/// Columns of a downloaded price table, in order.
pub const PRICE_COLUMNS: [&str; 6] = [OPEN, HIGH, LOW, CLOSE, ADJ_CLOSE, VOLUME];

/// Name of the rolling mean column for a window.
#[must_use]
pub fn rolling_mean(window: usize) -> String {
    format!("rolling_mean_{window}d")
}

/// Name of the rolling standard deviation column for a window.
#[must_use]
pub fn rolling_std(window: usize) -> String {
    format!("rolling_std_{window}d")
}

/// Name of the rolling variance column for a window.
#[must_use]
pub fn rolling_var(window: usize) -> String {
    format!("rolling_var_{window}d")
}
