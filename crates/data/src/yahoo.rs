//! Yahoo Finance source.

use polars::prelude::*;
use stockcast_primitives::{Date, DateRange, Symbol, columns, epoch_days, from_epoch_days};
use stockcast_traits::{MarketDataSource, SourceError};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

use crate::DataError;

const SECONDS_PER_DAY: i64 = 86_400;

/// Daily bars from the Yahoo Finance chart API.
pub struct YahooSource {
    connector: yahoo::YahooConnector,
}

impl std::fmt::Debug for YahooSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooSource").finish_non_exhaustive()
    }
}

impl YahooSource {
    /// Create a source with a fresh HTTP client.
    ///
    /// # Errors
    /// Returns `DataError::Connector` if the client cannot be built.
    pub fn new() -> Result<Self, DataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| DataError::Connector(e.to_string()))?;
        Ok(Self { connector })
    }
}

fn midnight_utc(date: Date) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(i64::from(epoch_days(date)) * SECONDS_PER_DAY).ok()
}

fn bar_date(timestamp: i64) -> Option<Date> {
    from_epoch_days(i32::try_from(timestamp.div_euclid(SECONDS_PER_DAY)).ok()?)
}

/// Turn quotes into a price table restricted to `range`, sorted by date.
fn quotes_to_frame(
    symbol: &Symbol,
    range: DateRange,
    quotes: &[yahoo::Quote],
) -> Result<DataFrame, SourceError> {
    let mut bars: Vec<(Date, &yahoo::Quote)> = quotes
        .iter()
        .filter_map(|q| bar_date(q.timestamp).map(|d| (d, q)))
        .filter(|(d, _)| range.contains(*d))
        .collect();
    bars.sort_by_key(|(d, _)| *d);
    bars.dedup_by_key(|(d, _)| *d);

    if bars.is_empty() {
        return Err(SourceError::NoData {
            symbol: symbol.to_string(),
            start: range.start().to_string(),
            end: range.end().to_string(),
        });
    }

    let pick = |f: fn(&yahoo::Quote) -> f64| bars.iter().map(|(_, q)| f(q)).collect::<Vec<f64>>();
    let df = DataFrame::new(vec![
        Column::new(columns::DATE.into(), bars.iter().map(|(d, _)| *d).collect::<Vec<Date>>()),
        Column::new(columns::OPEN.into(), pick(|q| q.open)),
        Column::new(columns::HIGH.into(), pick(|q| q.high)),
        Column::new(columns::LOW.into(), pick(|q| q.low)),
        Column::new(columns::CLOSE.into(), pick(|q| q.close)),
        Column::new(columns::ADJ_CLOSE.into(), pick(|q| q.adjclose)),
        Column::new(
            columns::VOLUME.into(),
            bars.iter().map(|(_, q)| q.volume).collect::<Vec<u64>>(),
        ),
    ])?;
    Ok(df)
}

impl MarketDataSource for YahooSource {
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        range: DateRange,
    ) -> Result<DataFrame, SourceError> {
        let malformed = |message: String| SourceError::Malformed {
            symbol: symbol.to_string(),
            message,
        };
        let start = midnight_utc(range.start())
            .ok_or_else(|| malformed(format!("start date {} out of range", range.start())))?;
        // The API treats the end timestamp as exclusive.
        let end = range
            .end()
            .succ_opt()
            .and_then(midnight_utc)
            .ok_or_else(|| malformed(format!("end date {} out of range", range.end())))?;

        let response = self
            .connector
            .get_quote_history(symbol.as_str(), start, end)
            .await
            .map_err(|e| SourceError::Request {
                symbol: symbol.to_string(),
                message: e.to_string(),
            })?;
        let quotes = response.quotes().map_err(|e| malformed(e.to_string()))?;
        debug!(%symbol, quotes = quotes.len(), "quotes received");

        quotes_to_frame(symbol, range, &quotes)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(date: Date, close: f64) -> yahoo::Quote {
        // US sessions open at 14:30 UTC.
        let timestamp = i64::from(epoch_days(date)) * SECONDS_PER_DAY + 52_200;
        yahoo::Quote {
            timestamp,
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            volume: 1_000,
            close,
            adjclose: close * 0.99,
        }
    }

    fn date(d: u32) -> Date {
        Date::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn quotes_become_sorted_table_within_range() {
        let quotes = [quote(date(6), 12.0), quote(date(2), 10.0), quote(date(5), 11.0)];
        let range = DateRange::new(date(2), date(5)).unwrap();
        let df = quotes_to_frame(&Symbol::new("abc"), range, &quotes).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 7);
        let close = df.column(columns::CLOSE).unwrap().f64().unwrap();
        assert_eq!(close.into_iter().collect::<Vec<_>>(), vec![Some(10.0), Some(11.0)]);
    }

    #[test]
    fn empty_range_is_no_data() {
        let range = DateRange::new(date(10), date(12)).unwrap();
        let err = quotes_to_frame(&Symbol::new("abc"), range, &[quote(date(2), 1.0)]).unwrap_err();
        assert!(matches!(err, SourceError::NoData { .. }));
    }

    #[test]
    fn midnight_round_trip() {
        let t = midnight_utc(date(29)).unwrap();
        assert_eq!(bar_date(t.unix_timestamp()), Some(date(29)));
    }
}
