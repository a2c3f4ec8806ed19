//! Yahoo chart REST provider.
//!
//! Implements [`DataProvider`](crate::providers::DataProvider) and
//! [`RateProvider`](crate::providers::RateProvider) against the public
//! `v8/finance/chart` endpoint. Equity/ETF symbols are queried directly; FX
//! pairs use the synthetic `"{FROM}{TO}=X"` symbols of the same endpoint, so
//! one HTTP code path serves both traits.

mod params;
mod provider;
mod response;

pub use provider::{DEFAULT_BASE_URL, YahooChartProvider};
