//! Currency codes and pivot-relative pair symbols

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The currency through which all cross rates are triangulated.
pub const PIVOT: CurrencyCode = CurrencyCode::USD;

/// Closed set of currencies the engine can value in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CurrencyCode {
    USD,
    EUR,
    CHF,
    GBP,
    JPY,
    CAD,
    AUD,
    INR,
    SGD,
}

impl CurrencyCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::USD => "USD",
            CurrencyCode::EUR => "EUR",
            CurrencyCode::CHF => "CHF",
            CurrencyCode::GBP => "GBP",
            CurrencyCode::JPY => "JPY",
            CurrencyCode::CAD => "CAD",
            CurrencyCode::AUD => "AUD",
            CurrencyCode::INR => "INR",
            CurrencyCode::SGD => "SGD",
        }
    }

    /// Synthetic market-data symbol for the pivot→`self` quote, e.g. "USDEUR".
    pub fn pivot_pair_symbol(&self) -> String {
        format!("{PIVOT}{self}")
    }

    /// Inverse of [`pivot_pair_symbol`](Self::pivot_pair_symbol): recovers the
    /// non-pivot leg from a pair symbol, or `None` for foreign symbols.
    pub fn from_pivot_pair_symbol(symbol: &str) -> Option<CurrencyCode> {
        symbol
            .strip_prefix(PIVOT.as_str())
            .and_then(|leg| leg.parse().ok())
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(CurrencyCode::USD),
            "EUR" => Ok(CurrencyCode::EUR),
            "CHF" => Ok(CurrencyCode::CHF),
            "GBP" => Ok(CurrencyCode::GBP),
            "JPY" => Ok(CurrencyCode::JPY),
            "CAD" => Ok(CurrencyCode::CAD),
            "AUD" => Ok(CurrencyCode::AUD),
            "INR" => Ok(CurrencyCode::INR),
            "SGD" => Ok(CurrencyCode::SGD),
            _ => Err(anyhow::anyhow!("Unknown currency code: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_symbol_round_trips() {
        assert_eq!(CurrencyCode::EUR.pivot_pair_symbol(), "USDEUR");
        assert_eq!(
            CurrencyCode::from_pivot_pair_symbol("USDEUR"),
            Some(CurrencyCode::EUR)
        );
    }

    #[test]
    fn foreign_symbols_are_rejected() {
        assert_eq!(CurrencyCode::from_pivot_pair_symbol("AMZN"), None);
        assert_eq!(CurrencyCode::from_pivot_pair_symbol("EURCHF"), None);
        assert_eq!(CurrencyCode::from_pivot_pair_symbol("USDXXX"), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("chf".parse::<CurrencyCode>().unwrap(), CurrencyCode::CHF);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
