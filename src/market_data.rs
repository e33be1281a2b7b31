//! Market data value objects and collaborator contracts
//!
//! The engine consumes two collaborators: a durable store of daily closing
//! prices (including synthetic currency-pair symbols such as "USDEUR") and a
//! real-time quote source for same-day lookups. Both are injected as trait
//! objects; this crate implements neither.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;

/// A single daily closing price for a symbol.
///
/// `currency` is populated when the source knows it (live quotes); historical
/// store rows leave it `None` and rely on the caller's symbol→currency map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub symbol: String,
    pub date: NaiveDate,
    pub market_price: Decimal,
    pub currency: Option<CurrencyCode>,
}

/// Date selection for range queries: a half-open range (either bound
/// optional) or an explicit set of days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateQuery {
    Range {
        /// Inclusive lower bound.
        gte: Option<NaiveDate>,
        /// Exclusive upper bound.
        lt: Option<NaiveDate>,
    },
    Dates(Vec<NaiveDate>),
}

impl DateQuery {
    pub fn range(gte: Option<NaiveDate>, lt: Option<NaiveDate>) -> Self {
        DateQuery::Range { gte, lt }
    }

    pub fn dates(dates: Vec<NaiveDate>) -> Self {
        DateQuery::Dates(dates)
    }

    /// Whether `day` falls inside this query.
    pub fn includes(&self, day: NaiveDate) -> bool {
        match self {
            DateQuery::Range { gte, lt } => {
                gte.is_none_or(|gte| gte <= day) && lt.is_none_or(|lt| day < lt)
            }
            DateQuery::Dates(dates) => dates.contains(&day),
        }
    }

    /// Whether the query covers the current calendar day, which selects the
    /// live quote path in addition to the historical one.
    pub fn includes_today(&self) -> bool {
        self.includes(Utc::now().date_naive())
    }
}

/// Durable point and range lookups of daily closing prices.
#[async_trait]
pub trait MarketDataStore: Send + Sync {
    /// Fetch the closing price of `symbol` on `date`, if recorded.
    async fn get_point(&self, date: NaiveDate, symbol: &str) -> Result<Option<PricePoint>>;

    /// Fetch all recorded prices for `symbols` within `date_query`, ordered
    /// by ascending date. Ties on date follow the order of `symbols`; a store
    /// never holds two rows for the same (date, symbol).
    async fn get_range(
        &self,
        date_query: &DateQuery,
        symbols: &[String],
    ) -> Result<Vec<PricePoint>>;
}

/// Same-day prices from a real-time source.
#[async_trait]
pub trait LiveQuoteProvider: Send + Sync {
    /// Fetch today's quotes for `symbols`. Symbols the source cannot quote
    /// are absent from the map; that is not an error.
    async fn get_live(&self, symbols: &[String]) -> Result<HashMap<String, PricePoint>>;
}
