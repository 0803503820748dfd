//! Market data source abstraction.

use std::future::Future;

use polars::prelude::*;
use stockcast_primitives::{DateRange, Symbol};

/// Errors raised by a market data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The provider could not be reached or returned a transport failure.
    #[error("request for {symbol} failed: {message}")]
    Request {
        /// Symbol being fetched.
        symbol: String,
        /// Provider message.
        message: String,
    },

    /// The provider answered but had no bars for the range.
    #[error("no data for {symbol} between {start} and {end}")]
    NoData {
        /// Symbol being fetched.
        symbol: String,
        /// Requested start date.
        start: String,
        /// Requested end date.
        end: String,
    },

    /// The response could not be turned into a table.
    #[error("malformed response for {symbol}: {message}")]
    Malformed {
        /// Symbol being fetched.
        symbol: String,
        /// Description of the problem.
        message: String,
    },

    /// Polars error while building the table.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),
}

/// Provider of historical OHLCV bars.
///
/// Implementations return a table with a `date` column of dtype `Date`
/// followed by the price columns (`Open`, `High`, `Low`, `Close`,
/// `Adj Close`, `Volume`), sorted by date. Both ends of the range are
/// inclusive.
pub trait MarketDataSource: Send + Sync {
    /// Fetch the price history of `symbol` over `range`.
    ///
    /// # Errors
    /// Returns `SourceError` on transport failures or empty responses. No
    /// retry is attempted.
    fn fetch_history(
        &self,
        symbol: &Symbol,
        range: DateRange,
    ) -> impl Future<Output = Result<DataFrame, SourceError>> + Send;

    /// Short provider name used in log messages.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptySource;

    impl MarketDataSource for EmptySource {
        async fn fetch_history(
            &self,
            symbol: &Symbol,
            range: DateRange,
        ) -> Result<DataFrame, SourceError> {
            Err(SourceError::NoData {
                symbol: symbol.to_string(),
                start: range.start().to_string(),
                end: range.end().to_string(),
            })
        }

        fn name(&self) -> &str {
            "empty"
        }
    }

    #[tokio::test]
    async fn source_error_propagates() {
        let start = stockcast_primitives::Date::from_ymd_opt(2024, 1, 1).unwrap();
        let range = DateRange::new(start, start).unwrap();
        let err = EmptySource.fetch_history(&Symbol::new("spy"), range).await.unwrap_err();
        assert_eq!(err.to_string(), "no data for SPY between 2024-01-01 and 2024-01-01");
    }
}
