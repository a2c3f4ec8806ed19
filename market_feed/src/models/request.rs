//! Universal request parameters for daily bar data.

use chrono::NaiveDate;

/// Parameters for requesting daily OHLCV bars from any provider.
///
/// Both bounds are inclusive calendar dates. Providers return whatever bars
/// exist inside the window; an empty response for a window that only covers
/// non-trading days is normal and not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct BarsRequest {
    /// Provider-facing symbol (e.g. `"VWCE.DE"`, `"SPY"`).
    pub symbol: String,

    /// First date of the window (inclusive).
    pub start: NaiveDate,

    /// Last date of the window (inclusive).
    pub end: NaiveDate,
}

impl BarsRequest {
    /// Convenience constructor.
    pub fn new(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
        }
    }
}
