//! Exchange rate resolution with pivot triangulation
//!
//! Currency quotes are stored pivot-relative ("USDEUR", "USDCHF", ...), so
//! only O(currencies) pair symbols ever need fetching; any cross rate is
//! derived by cancelling the pivot leg. All arithmetic stays in
//! [`Decimal`] so chained divisions do not accumulate binary rounding error.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::currency::{CurrencyCode, PIVOT};
use crate::market_data::{DateQuery, MarketDataStore};

/// Per-day multipliers converting one unit of each source currency into the
/// destination currency requested from the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateExchangeRates {
    pub date: NaiveDate,
    pub rates: HashMap<CurrencyCode, Decimal>,
}

/// Resolves exchange rate series from pivot-relative pair quotes held in the
/// market data store. Stateless; every call builds its tables from scratch.
pub struct ExchangeRateResolver {
    market_data: Arc<dyn MarketDataStore>,
}

impl ExchangeRateResolver {
    pub fn new(market_data: Arc<dyn MarketDataStore>) -> Self {
        ExchangeRateResolver { market_data }
    }

    /// Produce one [`DateExchangeRates`] per distinct quote date inside
    /// `date_query`, in chronological order.
    ///
    /// A source currency without a resolvable rate on a given day is omitted
    /// from that day's map; callers must treat absence, not zero, as
    /// "unresolvable".
    #[instrument(
        name = "ExchangeRates",
        skip(self, date_query),
        fields(destination = %destination)
    )]
    pub async fn get_exchange_rates(
        &self,
        source_currencies: &[CurrencyCode],
        destination: CurrencyCode,
        date_query: &DateQuery,
    ) -> Result<Vec<DateExchangeRates>> {
        let symbols: Vec<String> = source_currencies
            .iter()
            .chain(std::iter::once(&destination))
            .filter(|currency| **currency != PIVOT)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(CurrencyCode::pivot_pair_symbol)
            .collect();

        let quotes = self.market_data.get_range(date_query, &symbols).await?;
        debug!(pairs = symbols.len(), quotes = quotes.len(), "Fetched pair quotes");

        let Some(first) = quotes.first() else {
            return Ok(Vec::new());
        };

        // Quotes arrive date-sorted; a day boundary is wherever the date
        // changes. Each day accumulates its own pivot-relative table.
        let mut results = Vec::new();
        let mut current_date = first.date;
        let mut day_rates: HashMap<CurrencyCode, Decimal> = HashMap::new();
        for quote in &quotes {
            if quote.date != current_date {
                results.push(DateExchangeRates {
                    date: current_date,
                    rates: cross_rates(&day_rates, source_currencies, destination),
                });
                current_date = quote.date;
                day_rates.clear();
            }
            if let Some(currency) = CurrencyCode::from_pivot_pair_symbol(&quote.symbol) {
                day_rates.insert(currency, quote.market_price);
            }
        }
        results.push(DateExchangeRates {
            date: current_date,
            rates: cross_rates(&day_rates, source_currencies, destination),
        });

        Ok(results)
    }

    /// Single-day currency conversion: the degenerate case of
    /// [`get_exchange_rates`](Self::get_exchange_rates).
    ///
    /// An unknown currency or an unresolvable rate leaves the amount
    /// unchanged; conversion never fails on missing data.
    pub async fn convert(
        &self,
        amount: Decimal,
        currency: Option<CurrencyCode>,
        destination: CurrencyCode,
        date: NaiveDate,
    ) -> Result<Decimal> {
        let Some(currency) = currency else {
            return Ok(amount);
        };
        if currency == destination {
            return Ok(amount);
        }

        let series = self
            .get_exchange_rates(&[currency], destination, &DateQuery::dates(vec![date]))
            .await?;
        let rate = series
            .iter()
            .find_map(|day| day.rates.get(&currency).copied());

        Ok(rate.map_or(amount, |rate| rate * amount))
    }
}

/// Cross rates for one day from its pivot-relative table, by cases:
/// identity, direct pivot quote, inverse pivot quote, or triangulation
/// through the pivot. A missing or zero leg omits the currency.
fn cross_rates(
    day_rates: &HashMap<CurrencyCode, Decimal>,
    source_currencies: &[CurrencyCode],
    destination: CurrencyCode,
) -> HashMap<CurrencyCode, Decimal> {
    let mut rates = HashMap::new();

    for &source in source_currencies {
        let rate = if source == destination {
            Some(Decimal::ONE)
        } else if source == PIVOT {
            day_rates.get(&destination).copied()
        } else if destination == PIVOT {
            day_rates
                .get(&source)
                .and_then(|leg| Decimal::ONE.checked_div(*leg))
        } else {
            match (day_rates.get(&destination), day_rates.get(&source)) {
                (Some(to_leg), Some(from_leg)) => to_leg.checked_div(*from_leg),
                _ => None,
            }
        };

        if let Some(rate) = rate {
            rates.insert(source, rate);
        }
    }

    rates
}
