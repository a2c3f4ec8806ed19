//! Resilient bar fetching.
//!
//! Wraps a [`DataProvider`] call in the retry policy. This layer has no
//! storage side effects: its only output is the fetched bars or a terminal
//! per-symbol failure the orchestrator records and moves past.

use chrono::NaiveDate;
use market_feed::models::{bar::RawBar, request::BarsRequest};
use market_feed::providers::{DataProvider, ProviderError};
use market_feed::retry::{RetryPolicy, with_retry};
use thiserror::Error;

/// Terminal fetch failure for one symbol's window.
#[derive(Debug, Error)]
pub enum FetchError {
    /// All attempts failed (or a non-retryable error occurred).
    #[error("fetch for {symbol} [{start}..{end}] failed after {attempts} attempt(s): {source}")]
    Exhausted {
        /// Provider-facing symbol.
        symbol: String,
        /// Window start (inclusive).
        start: NaiveDate,
        /// Window end (inclusive).
        end: NaiveDate,
        /// Number of attempts made.
        attempts: u32,
        /// The last provider error observed.
        source: ProviderError,
    },
}

/// Fetches daily bars for a window, retrying transient provider errors per
/// the policy. An empty response is a success.
pub async fn fetch_window(
    provider: &(dyn DataProvider + Send + Sync),
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    policy: &RetryPolicy,
) -> Result<Vec<RawBar>, FetchError> {
    let request = BarsRequest::new(symbol, start, end);

    with_retry(policy, ProviderError::is_transient, || {
        provider.fetch_daily_bars(&request)
    })
    .await
    .map_err(|(source, attempts)| FetchError::Exhausted {
        symbol: symbol.to_string(),
        start,
        end,
        attempts,
        source,
    })
}
