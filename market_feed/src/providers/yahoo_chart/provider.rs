use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, header};
use shared_utils::env::get_env_var_or;

use crate::models::{bar::RawBar, rate::RatePoint, request::BarsRequest};
use crate::providers::yahoo_chart::{params::chart_query, response::ChartResponse};
use crate::providers::{DataProvider, ProviderError, RateProvider};

/// Default base URL of the chart endpoint.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Environment variable that overrides the base URL (used by tests and
/// self-hosted proxies).
const BASE_URL_ENV: &str = "MARKET_FEED_CHART_BASE_URL";

/// Per-call timeout. Hung calls surface as network errors and go through the
/// retry policy like any other transient failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-based provider for the Yahoo chart endpoint.
///
/// Serves both daily OHLCV bars and historical FX rates; the latter query the
/// same endpoint with synthetic `"{FROM}{TO}=X"` symbols and read the close
/// column as the day's fix.
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    /// Creates a provider against the default (or env-overridden) base URL.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(get_env_var_or(BASE_URL_ENV, DEFAULT_BASE_URL))
    }

    /// Creates a provider against an explicit base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let mut headers = header::HeaderMap::new();
        // The endpoint rejects requests without a browser-ish user agent.
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("Mozilla/5.0 (compatible; etf-sync)"),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn chart(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, ProviderError> {
        if end < start {
            return Err(ProviderError::Validation(format!(
                "window end {end} precedes start {start}"
            )));
        }

        let url = format!("{}/{}", self.base_url, symbol);
        let response = self
            .client
            .get(&url)
            .query(&chart_query(start, end))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: ChartResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        parsed.into_raw_bars()
    }
}

#[async_trait]
impl DataProvider for YahooChartProvider {
    async fn fetch_daily_bars(&self, request: &BarsRequest) -> Result<Vec<RawBar>, ProviderError> {
        self.chart(&request.symbol, request.start, request.end).await
    }
}

#[async_trait]
impl RateProvider for YahooChartProvider {
    async fn fetch_rates(
        &self,
        from: &str,
        to: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>, ProviderError> {
        let symbol = format!("{from}{to}=X");
        let bars = self.chart(&symbol, start, end).await?;
        // Days without a close have no usable fix; drop them, the series is
        // sparse by contract.
        Ok(bars
            .into_iter()
            .filter_map(|b| b.close.map(|rate| RatePoint { date: b.date, rate }))
            .collect())
    }
}
