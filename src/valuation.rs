//! Security valuation in a user-chosen currency
//!
//! [`ValuationService`] blends two sources behind one interface: today's
//! prices come from the live quote provider, historical prices from the
//! market data store, and both are converted with rates from the
//! [`ExchangeRateResolver`]. Batch lookups tolerate gaps (weekends, newly
//! listed securities) by carrying the most recent earlier rate forward and
//! silently dropping points that never had one.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::currency::CurrencyCode;
use crate::error::ValuationError;
use crate::exchange_rate::ExchangeRateResolver;
use crate::market_data::{DateQuery, LiveQuoteProvider, MarketDataStore};

/// A security price already expressed in the requested destination currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuedPoint {
    pub symbol: String,
    pub date: NaiveDate,
    pub market_price: Decimal,
}

/// Entry point of the engine. Holds no mutable state; safe to share across
/// concurrent requests.
pub struct ValuationService {
    market_data: Arc<dyn MarketDataStore>,
    live_quotes: Arc<dyn LiveQuoteProvider>,
    exchange_rates: ExchangeRateResolver,
}

impl ValuationService {
    pub fn new(
        market_data: Arc<dyn MarketDataStore>,
        live_quotes: Arc<dyn LiveQuoteProvider>,
    ) -> Self {
        let exchange_rates = ExchangeRateResolver::new(Arc::clone(&market_data));
        ValuationService {
            market_data,
            live_quotes,
            exchange_rates,
        }
    }

    pub fn exchange_rates(&self) -> &ExchangeRateResolver {
        &self.exchange_rates
    }

    /// Value one symbol on one day in `user_currency`.
    ///
    /// Today's date takes the live path and never fails on a missing quote
    /// (the price defaults to zero). A historical date with no stored record
    /// is a hard [`ValuationError::ValueNotFound`]: a single explicit lookup
    /// implies the caller expects that day to exist.
    #[instrument(name = "GetValue", skip(self), fields(symbol = %symbol, date = %date))]
    pub async fn get_value(
        &self,
        currency: CurrencyCode,
        date: NaiveDate,
        symbol: &str,
        user_currency: CurrencyCode,
    ) -> Result<ValuedPoint, ValuationError> {
        let today = Utc::now().date_naive();
        if date == today {
            let quotes = self.live_quotes.get_live(&[symbol.to_string()]).await?;
            let market_price = quotes
                .get(symbol)
                .map_or(Decimal::ZERO, |quote| quote.market_price);
            let market_price = self
                .exchange_rates
                .convert(market_price, Some(currency), user_currency, today)
                .await?;
            return Ok(ValuedPoint {
                symbol: symbol.to_string(),
                date: today,
                market_price,
            });
        }

        match self.market_data.get_point(date, symbol).await? {
            Some(point) => {
                let market_price = self
                    .exchange_rates
                    .convert(point.market_price, Some(currency), user_currency, point.date)
                    .await?;
                Ok(ValuedPoint {
                    symbol: point.symbol,
                    date: point.date,
                    market_price,
                })
            }
            None => Err(ValuationError::ValueNotFound {
                symbol: symbol.to_string(),
                date,
            }),
        }
    }

    /// Value a batch of symbols over a date query in `user_currency`.
    ///
    /// The live branch runs only when the query covers today; the historical
    /// branch always runs. Both fetch concurrently and their rows are
    /// concatenated live-first, each branch chronological within itself.
    /// Missing data never fails a batch: unquoted live symbols come back with
    /// price zero and historical points without a resolvable rate are
    /// omitted.
    #[instrument(name = "GetValues", skip_all, fields(symbols = symbols.len(), user_currency = %user_currency))]
    pub async fn get_values(
        &self,
        currencies: &HashMap<String, CurrencyCode>,
        date_query: &DateQuery,
        symbols: &[String],
        user_currency: CurrencyCode,
    ) -> Result<Vec<ValuedPoint>, ValuationError> {
        let (mut values, historical) = futures::future::try_join(
            self.live_values(date_query, symbols, user_currency),
            self.historical_values(currencies, date_query, symbols, user_currency),
        )
        .await?;

        values.extend(historical);
        Ok(values)
    }

    /// Today's rows from the live quote provider, or nothing when the query
    /// does not cover today.
    async fn live_values(
        &self,
        date_query: &DateQuery,
        symbols: &[String],
        user_currency: CurrencyCode,
    ) -> Result<Vec<ValuedPoint>, ValuationError> {
        if !date_query.includes_today() {
            return Ok(Vec::new());
        }

        let today = Utc::now().date_naive();
        let quotes = self.live_quotes.get_live(symbols).await?;
        debug!(requested = symbols.len(), quoted = quotes.len(), "Fetched live quotes");

        // One rate fetch for the distinct currencies the provider reported.
        let live_currencies: Vec<CurrencyCode> = quotes
            .values()
            .filter_map(|quote| quote.currency)
            .filter(|currency| *currency != user_currency)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let today_rates: HashMap<CurrencyCode, Decimal> = if live_currencies.is_empty() {
            HashMap::new()
        } else {
            self.exchange_rates
                .get_exchange_rates(
                    &live_currencies,
                    user_currency,
                    &DateQuery::dates(vec![today]),
                )
                .await?
                .into_iter()
                .next()
                .map_or_else(HashMap::new, |day| day.rates)
        };

        // Every requested symbol yields a row; a symbol the provider omitted
        // is priced zero, and a quote without a currency passes through as
        // already being in destination units.
        let values = symbols
            .iter()
            .map(|symbol| {
                let quote = quotes.get(symbol);
                let price = quote.map_or(Decimal::ZERO, |quote| quote.market_price);
                let market_price = match quote.and_then(|quote| quote.currency) {
                    Some(currency) if currency != user_currency => today_rates
                        .get(&currency)
                        .map_or(price, |rate| rate * price),
                    _ => price,
                };
                ValuedPoint {
                    symbol: symbol.clone(),
                    date: today,
                    market_price,
                }
            })
            .collect();
        Ok(values)
    }

    /// Historical rows: one rate-series fetch plus one market-data range
    /// fetch regardless of how many points come back.
    async fn historical_values(
        &self,
        currencies: &HashMap<String, CurrencyCode>,
        date_query: &DateQuery,
        symbols: &[String],
        user_currency: CurrencyCode,
    ) -> Result<Vec<ValuedPoint>, ValuationError> {
        let source_currencies: Vec<CurrencyCode> = currencies
            .values()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let (exchange_rates, points) = futures::future::try_join(
            self.exchange_rates
                .get_exchange_rates(&source_currencies, user_currency, date_query),
            self.market_data.get_range(date_query, symbols),
        )
        .await?;
        debug!(
            rate_days = exchange_rates.len(),
            points = points.len(),
            "Fetched rate series and market data"
        );

        // Both sequences are chronological, so a single forward cursor over
        // the rate series finds the latest entry dated at or before each
        // point; the cursor never resets.
        let mut values = Vec::with_capacity(points.len());
        let mut j = 0;
        for point in points {
            while j + 1 < exchange_rates.len() && exchange_rates[j + 1].date <= point.date {
                j += 1;
            }

            let Some(&currency) = currencies.get(&point.symbol) else {
                debug!(symbol = %point.symbol, "Symbol has no currency mapping, dropping");
                continue;
            };

            let multiplier = if currency == user_currency {
                Some(Decimal::ONE)
            } else {
                // Carry-forward: scan back from the cursor for the most
                // recent day that resolved this currency.
                exchange_rates
                    .iter()
                    .take(j + 1)
                    .rev()
                    .find_map(|day| day.rates.get(&currency).copied())
            };

            if let Some(rate) = multiplier {
                values.push(ValuedPoint {
                    symbol: point.symbol,
                    date: point.date,
                    market_price: rate * point.market_price,
                });
            }
        }
        Ok(values)
    }
}
