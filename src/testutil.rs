//! In-memory collaborator fixtures shared by the unit tests.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::currency::CurrencyCode;
use crate::market_data::{DateQuery, LiveQuoteProvider, MarketDataStore, PricePoint};

pub(crate) fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, dom).unwrap()
}

fn stored_point(symbol: &str, date: NaiveDate, market_price: Decimal) -> PricePoint {
    PricePoint {
        symbol: symbol.to_string(),
        date,
        market_price,
        currency: None,
    }
}

/// A currency-pair quote as the market data store would hold it.
pub(crate) fn pair_quote(symbol: &str, date: NaiveDate, market_price: Decimal) -> PricePoint {
    stored_point(symbol, date, market_price)
}

/// A historical security price; the currency lives in the caller's map.
pub(crate) fn security_price(symbol: &str, date: NaiveDate, market_price: Decimal) -> PricePoint {
    stored_point(symbol, date, market_price)
}

/// Market data store backed by a fixed list of points.
pub(crate) struct FixtureStore {
    points: Vec<PricePoint>,
}

impl FixtureStore {
    pub(crate) fn new(points: Vec<PricePoint>) -> Self {
        FixtureStore { points }
    }
}

#[async_trait]
impl MarketDataStore for FixtureStore {
    async fn get_point(&self, date: NaiveDate, symbol: &str) -> Result<Option<PricePoint>> {
        Ok(self
            .points
            .iter()
            .find(|point| point.date == date && point.symbol == symbol)
            .cloned())
    }

    async fn get_range(
        &self,
        date_query: &DateQuery,
        symbols: &[String],
    ) -> Result<Vec<PricePoint>> {
        let mut rows: Vec<PricePoint> = self
            .points
            .iter()
            .filter(|point| symbols.contains(&point.symbol) && date_query.includes(point.date))
            .cloned()
            .collect();
        // Date-ascending, ties broken by the order of the requested symbols.
        rows.sort_by_key(|point| {
            (
                point.date,
                symbols.iter().position(|symbol| *symbol == point.symbol),
            )
        });
        Ok(rows)
    }
}

/// Live quote provider answering from a fixed symbol→quote map.
pub(crate) struct FixtureLiveQuotes {
    quotes: HashMap<String, PricePoint>,
}

impl FixtureLiveQuotes {
    pub(crate) fn new(quotes: Vec<PricePoint>) -> Self {
        FixtureLiveQuotes {
            quotes: quotes
                .into_iter()
                .map(|quote| (quote.symbol.clone(), quote))
                .collect(),
        }
    }

    pub(crate) fn empty() -> Self {
        FixtureLiveQuotes::new(Vec::new())
    }
}

#[async_trait]
impl LiveQuoteProvider for FixtureLiveQuotes {
    async fn get_live(&self, symbols: &[String]) -> Result<HashMap<String, PricePoint>> {
        Ok(symbols
            .iter()
            .filter_map(|symbol| self.quotes.get(symbol).cloned())
            .map(|quote| (quote.symbol.clone(), quote))
            .collect())
    }
}

/// A same-day quote as the live provider would return it.
pub(crate) fn live_quote(
    symbol: &str,
    date: NaiveDate,
    market_price: Decimal,
    currency: Option<CurrencyCode>,
) -> PricePoint {
    PricePoint {
        symbol: symbol.to_string(),
        date,
        market_price,
        currency,
    }
}
