//! Canonical in-memory representation of a daily OHLCV bar as returned by a
//! provider, before any quality screening.

use chrono::NaiveDate;

/// One daily price bar for a symbol, in the symbol's native currency.
///
/// All value fields are optional because vendors routinely emit nulls for
/// individual cells (half-session days, stale listings). Deciding what to do
/// with incomplete bars is the job of the data quality screen downstream,
/// not of the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    /// Calendar date of the bar (exchange local trading day).
    pub date: NaiveDate,

    /// Opening price.
    pub open: Option<f64>,

    /// Highest price of the day.
    pub high: Option<f64>,

    /// Lowest price of the day.
    pub low: Option<f64>,

    /// Closing price.
    pub close: Option<f64>,

    /// Shares/units traded. Not all providers supply this for every bar.
    pub volume: Option<i64>,
}
