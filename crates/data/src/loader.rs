//! Download-and-cache entry point.

use polars::prelude::DataFrame;
use stockcast_primitives::{DateRange, Symbol, columns};
use stockcast_traits::MarketDataSource;
use tracing::{info, warn};

use crate::{DataError, LoaderConfig, save_to_csv};

/// Fetch the daily price table of `symbol` over `range` and cache it.
///
/// Both ends of `range` are inclusive. The table is written to
/// `{save_dir}/{SYMBOL}_historical.csv`, creating the directory if needed.
/// A table without an `Adj Close` column is logged as a warning and still
/// returned.
///
/// # Errors
/// Returns `DataError::Source` if the source fails (no retry is attempted)
/// and `DataError::Io` if the cache file cannot be written.
pub async fn load_stock_data<S>(
    source: &S,
    symbol: &Symbol,
    range: DateRange,
    config: &LoaderConfig,
) -> Result<DataFrame, DataError>
where
    S: MarketDataSource,
{
    info!(
        %symbol,
        source = source.name(),
        start = %range.start(),
        end = %range.end(),
        "downloading price history"
    );
    let df = source.fetch_history(symbol, range).await?;

    if df.column(columns::ADJ_CLOSE).is_err() {
        warn!(%symbol, "price table has no `{}` column", columns::ADJ_CLOSE);
    }

    let path = save_to_csv(&df, &symbol.history_file_name(), &config.save_dir)?;
    info!(%symbol, rows = df.height(), path = %path.display(), "price history cached");
    Ok(df)
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;
    use stockcast_primitives::Date;
    use stockcast_traits::SourceError;

    use super::*;

    struct Fixed {
        adjusted: bool,
    }

    impl MarketDataSource for Fixed {
        async fn fetch_history(
            &self,
            _symbol: &Symbol,
            range: DateRange,
        ) -> Result<DataFrame, SourceError> {
            let dates = vec![range.start(), range.end()];
            let mut df = df! {
                columns::DATE => dates,
                columns::CLOSE => [100.0, 101.0],
            }?;
            if self.adjusted {
                df.with_column(Column::new(columns::ADJ_CLOSE.into(), [99.0, 100.0]))?;
            }
            Ok(df)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct Failing;

    impl MarketDataSource for Failing {
        async fn fetch_history(
            &self,
            symbol: &Symbol,
            _range: DateRange,
        ) -> Result<DataFrame, SourceError> {
            Err(SourceError::Request { symbol: symbol.to_string(), message: "offline".into() })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn range() -> DateRange {
        let start = Date::from_ymd_opt(2024, 1, 2).unwrap();
        let end = Date::from_ymd_opt(2024, 1, 3).unwrap();
        DateRange::new(start, end).unwrap()
    }

    #[tokio::test]
    async fn caches_table_under_ticker_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoaderConfig::with_save_dir(dir.path().join("raw"));
        for adjusted in [true, false] {
            let df = load_stock_data(&Fixed { adjusted }, &Symbol::new("ibm"), range(), &config)
                .await
                .unwrap();
            assert_eq!(df.height(), 2);
            assert!(dir.path().join("raw").join("IBM_historical.csv").is_file());
        }
    }

    #[tokio::test]
    async fn source_failures_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoaderConfig::with_save_dir(dir.path());
        let err = load_stock_data(&Failing, &Symbol::new("ibm"), range(), &config).await.unwrap_err();
        assert!(matches!(err, DataError::Source(SourceError::Request { .. })));
        assert!(!dir.path().join("IBM_historical.csv").exists());
    }
}
