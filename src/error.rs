//! Engine error taxonomy

use chrono::NaiveDate;
use thiserror::Error;

/// Failures surfaced by the valuation entry points.
///
/// Missing data in batch lookups is recovered locally (rows are dropped or
/// zero-priced) and never reaches this type; only the explicit single-point
/// miss and collaborator faults propagate.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// A single explicit (symbol, date) lookup has no historical record.
    #[error("Value not found for {symbol} at {date}")]
    ValueNotFound { symbol: String, date: NaiveDate },

    /// A collaborator call failed; propagated unmodified, never retried here.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}
