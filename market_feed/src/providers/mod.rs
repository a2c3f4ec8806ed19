//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] and [`RateProvider`] traits, the
//! unified interfaces for fetching daily bar data and historical FX rates
//! from any market data vendor.
//!
//! Concrete implementations (see [`yahoo_chart`]) handle vendor-specific API
//! logic; both traits are designed for async usage and dynamic dispatch
//! (`dyn DataProvider`) so the pipeline can be exercised with mock providers
//! in tests.

pub mod errors;
pub mod yahoo_chart;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{bar::RawBar, rate::RatePoint, request::BarsRequest};

pub use errors::ProviderError;

/// Source of daily OHLCV bars.
#[async_trait]
pub trait DataProvider {
    /// Fetches daily bars for the request window (both bounds inclusive).
    ///
    /// Returns an empty vec when the window contains no trading days; that is
    /// a valid response, not an error.
    async fn fetch_daily_bars(&self, request: &BarsRequest) -> Result<Vec<RawBar>, ProviderError>;
}

/// Source of historical FX rates for a currency pair.
#[async_trait]
pub trait RateProvider {
    /// Fetches historical rates for `from`→`to` over the inclusive window.
    ///
    /// The returned series is sparse: dates without a fix (weekends,
    /// holidays) are simply absent.
    async fn fetch_rates(
        &self,
        from: &str,
        to: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>, ProviderError>;
}
