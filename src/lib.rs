//! Multi-currency valuation and exchange rate resolution.
//!
//! Given a security's native currency, a target currency and a point in time
//! (or range), the engine resolves a correct monetary value by combining
//! historical or same-day market prices with currency rates triangulated
//! through a pivot currency (USD), falling back to the nearest earlier known
//! rate when a day has no quote.
//!
//! The engine owns no data: prices and currency-pair quotes come from a
//! [`MarketDataStore`] and a [`LiveQuoteProvider`] supplied by the caller.

pub mod currency;
pub mod error;
pub mod exchange_rate;
pub mod market_data;
pub mod valuation;

#[cfg(test)]
pub(crate) mod testutil;

pub use currency::{CurrencyCode, PIVOT};
pub use error::ValuationError;
pub use exchange_rate::{DateExchangeRates, ExchangeRateResolver};
pub use market_data::{DateQuery, LiveQuoteProvider, MarketDataStore, PricePoint};
pub use valuation::{ValuationService, ValuedPoint};
