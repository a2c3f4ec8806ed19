//! Historical FX rate points.

use chrono::NaiveDate;

/// One historical exchange rate observation for a currency pair.
///
/// FX series are sparse: weekends and market holidays have no fix, so a
/// ranged request returns fewer points than calendar days. Callers must not
/// assume one point per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePoint {
    /// Calendar date of the rate fix.
    pub date: NaiveDate,

    /// Units of the quote currency per one unit of the base currency.
    pub rate: f64,
}
