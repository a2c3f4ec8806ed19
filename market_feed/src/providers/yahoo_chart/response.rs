//! Serde models for the chart endpoint response.
//!
//! Only the fields the pipeline consumes are mapped; everything else in the
//! payload is ignored. Value arrays are positional and parallel to
//! `timestamp`, with `null` holes for cells the vendor has no data for.

use chrono::DateTime;
use serde::Deserialize;

use crate::models::bar::RawBar;
use crate::providers::ProviderError;

#[derive(Debug, Deserialize)]
pub(super) struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub(super) struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub(super) struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct QuoteBlock {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<i64>>,
}

impl ChartResponse {
    /// Flattens the positional arrays into [`RawBar`]s, one per timestamp.
    ///
    /// A payload with no result series (symbol exists but the window has no
    /// trading days) yields an empty vec. An explicit API error object in the
    /// body is surfaced as [`ProviderError::Api`].
    pub fn into_raw_bars(self) -> Result<Vec<RawBar>, ProviderError> {
        if let Some(err) = self.chart.error {
            return Err(ProviderError::Api {
                status: 200,
                message: format!("{}: {}", err.code, err.description),
            });
        }

        let Some(mut results) = self.chart.result else {
            return Ok(vec![]);
        };
        let Some(result) = results.pop() else {
            return Ok(vec![]);
        };

        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, ts) in result.timestamp.iter().enumerate() {
            let date = DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| ProviderError::Decode(format!("timestamp out of range: {ts}")))?
                .date_naive();
            bars.push(RawBar {
                date,
                open: cell(&quote.open, i),
                high: cell(&quote.high, i),
                low: cell(&quote.low, i),
                close: cell(&quote.close, i),
                volume: cell(&quote.volume, i),
            });
        }
        Ok(bars)
    }
}

fn cell<T: Copy>(column: &[Option<T>], i: usize) -> Option<T> {
    column.get(i).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn flattens_parallel_arrays_with_null_holes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1638316800, 1638403200],
                    "indicators": {
                        "quote": [{
                            "open": [100.0, 101.5],
                            "high": [102.0, 103.0],
                            "low": [99.0, 100.5],
                            "close": [101.0, null],
                            "volume": [12000, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        let bars = parsed.into_raw_bars().unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2021, 12, 1).unwrap());
        assert_eq!(bars[0].close, Some(101.0));
        assert_eq!(bars[1].close, None);
        assert_eq!(bars[1].volume, None);
    }

    #[test]
    fn missing_result_is_an_empty_window() {
        let body = r#"{"chart": {"result": null, "error": null}}"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.into_raw_bars().unwrap().is_empty());
    }

    #[test]
    fn api_error_object_is_surfaced() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        let err = parsed.into_raw_bars().unwrap_err();
        assert!(matches!(err, ProviderError::Api { .. }));
    }
}
