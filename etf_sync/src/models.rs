//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`] for use with Diesel's Queryable/Insertable APIs:
//! - [`crate::schema::symbols`] — the instrument directory (read-only here)
//! - [`crate::schema::price_bars`] — daily OHLCV plus nullable EUR columns
//! - [`crate::schema::exchange_rates`] — historical FX rate cache
//! - [`crate::schema::fifty_two_week_metrics`] / [`crate::schema::decrease_thresholds`]
//!   — derived rolling metrics, replaced per (symbol, calculation_date)

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::schema::*;

/// A row in [`crate::schema::symbols`]: one tracked instrument.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = symbols, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Symbol {
    /// Database primary key (SQLite rowid).
    pub id: i32,
    /// International Securities Identification Number.
    pub isin: String,
    /// Provider-facing ticker (e.g. "VWCE.DE").
    pub ticker: String,
    /// Human-readable instrument name.
    pub name: String,
    /// Instrument kind, e.g. "ETF".
    pub asset_type: String,
    /// Listing exchange code.
    pub exchange: String,
    /// Native quote currency (ISO 4217, e.g. "USD").
    pub currency: String,
    /// Whether the pipeline should process this symbol.
    pub is_active: bool,
}

/// Insertable form of [`Symbol`], used by seeding and tests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = symbols)]
pub struct NewSymbol<'a> {
    /// ISIN of the instrument.
    pub isin: &'a str,
    /// Provider-facing ticker.
    pub ticker: &'a str,
    /// Human-readable name.
    pub name: &'a str,
    /// Instrument kind.
    pub asset_type: &'a str,
    /// Listing exchange code.
    pub exchange: &'a str,
    /// Native quote currency.
    pub currency: &'a str,
    /// Active flag.
    pub is_active: bool,
}

/// A row in [`crate::schema::price_bars`].
///
/// Native-currency columns are immutable once inserted; only the `*_eur`
/// columns may be populated later by the currency normalizer.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = price_bars, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Symbol, foreign_key = symbol_id))]
pub struct PriceBar {
    /// Database primary key.
    pub id: i32,
    /// FK to [`Symbol::id`].
    pub symbol_id: i32,
    /// Trading day of the bar.
    pub date: NaiveDate,
    /// Opening price (native currency).
    pub open: f64,
    /// Daily high (native currency).
    pub high: f64,
    /// Daily low (native currency).
    pub low: f64,
    /// Closing price (native currency).
    pub close: f64,
    /// Shares/units traded.
    pub volume: i64,
    /// Opening price converted to EUR, if normalized.
    pub open_eur: Option<f64>,
    /// Daily high converted to EUR, if normalized.
    pub high_eur: Option<f64>,
    /// Daily low converted to EUR, if normalized.
    pub low_eur: Option<f64>,
    /// Closing price converted to EUR, if normalized.
    pub close_eur: Option<f64>,
}

/// Insertable form of [`PriceBar`]: native columns only, EUR columns start
/// NULL and are filled by the normalizer.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = price_bars)]
pub struct NewPriceBar {
    /// FK to [`Symbol::id`].
    pub symbol_id: i32,
    /// Trading day of the bar.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Daily high.
    pub high: f64,
    /// Daily low.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Shares/units traded.
    pub volume: i64,
}

/// Changeset touching only the EUR columns of a price bar.
///
/// This is the "update only fields explicitly marked updatable" half of the
/// upsert contract: native columns can never be reached through it.
#[derive(Debug, Clone, Copy, AsChangeset)]
#[diesel(table_name = price_bars)]
pub struct EurPrices {
    /// Opening price in EUR.
    pub open_eur: f64,
    /// Daily high in EUR.
    pub high_eur: f64,
    /// Daily low in EUR.
    pub low_eur: f64,
    /// Closing price in EUR.
    pub close_eur: f64,
}

/// A row in [`crate::schema::exchange_rates`]: one cached historical rate.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = exchange_rates, check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRate {
    /// Database primary key.
    pub id: i32,
    /// Base currency (ISO 4217).
    pub from_currency: String,
    /// Quote currency (ISO 4217).
    pub to_currency: String,
    /// Date of the rate fix.
    pub rate_date: NaiveDate,
    /// Units of `to_currency` per one unit of `from_currency`.
    pub rate: f64,
}

/// Insertable form of [`ExchangeRate`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = exchange_rates)]
pub struct NewExchangeRate<'a> {
    /// Base currency.
    pub from_currency: &'a str,
    /// Quote currency.
    pub to_currency: &'a str,
    /// Date of the rate fix.
    pub rate_date: NaiveDate,
    /// The rate itself, kept at full f64 precision.
    pub rate: f64,
}

/// A row in [`crate::schema::fifty_two_week_metrics`].
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = fifty_two_week_metrics, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Symbol, foreign_key = symbol_id))]
pub struct FiftyTwoWeekMetric {
    /// Database primary key.
    pub id: i32,
    /// FK to [`Symbol::id`].
    pub symbol_id: i32,
    /// Run date the window ends at.
    pub calculation_date: NaiveDate,
    /// Highest close in the trailing window.
    pub high: f64,
    /// Lowest close in the trailing window.
    pub low: f64,
    /// First date the high occurred.
    pub high_date: NaiveDate,
    /// First date the low occurred.
    pub low_date: NaiveDate,
}

/// Insertable/replace form of [`FiftyTwoWeekMetric`].
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = fifty_two_week_metrics)]
pub struct NewFiftyTwoWeekMetric {
    /// FK to [`Symbol::id`].
    pub symbol_id: i32,
    /// Run date the window ends at.
    pub calculation_date: NaiveDate,
    /// Highest close in the trailing window.
    pub high: f64,
    /// Lowest close in the trailing window.
    pub low: f64,
    /// First date the high occurred.
    pub high_date: NaiveDate,
    /// First date the low occurred.
    pub low_date: NaiveDate,
}

/// A row in [`crate::schema::decrease_thresholds`]: target prices at fixed
/// percentage drops from the 52-week high.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = decrease_thresholds, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Symbol, foreign_key = symbol_id))]
pub struct DecreaseThreshold {
    /// Database primary key.
    pub id: i32,
    /// FK to [`Symbol::id`].
    pub symbol_id: i32,
    /// Run date the thresholds were computed for.
    pub calculation_date: NaiveDate,
    /// The 52-week high the drops are measured from.
    pub high_price: f64,
    /// Price at a 10% drop from the high.
    pub decrease_10_price: f64,
    /// Price at a 15% drop from the high.
    pub decrease_15_price: f64,
    /// Price at a 20% drop from the high.
    pub decrease_20_price: f64,
    /// Price at a 25% drop from the high.
    pub decrease_25_price: f64,
    /// Price at a 30% drop from the high.
    pub decrease_30_price: f64,
}

/// Insertable/replace form of [`DecreaseThreshold`].
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = decrease_thresholds)]
pub struct NewDecreaseThreshold {
    /// FK to [`Symbol::id`].
    pub symbol_id: i32,
    /// Run date the thresholds were computed for.
    pub calculation_date: NaiveDate,
    /// The 52-week high the drops are measured from.
    pub high_price: f64,
    /// Price at a 10% drop from the high.
    pub decrease_10_price: f64,
    /// Price at a 15% drop from the high.
    pub decrease_15_price: f64,
    /// Price at a 20% drop from the high.
    pub decrease_20_price: f64,
    /// Price at a 25% drop from the high.
    pub decrease_25_price: f64,
    /// Price at a 30% drop from the high.
    pub decrease_30_price: f64,
}
