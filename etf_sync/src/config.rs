//! Pipeline configuration: TOML model and loading.
//!
//! Everything the core consumes is gathered here: storage location, report
//! output, the fixed backfill start, the reporting currency, and the retry
//! envelope. Defaults match the long-standing production behavior (backfill
//! from 2021-12-01, EUR reporting, 3 attempts 60 s apart).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use market_feed::retry::{Backoff, RetryPolicy};
use serde::Deserialize;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Path to the SQLite database file. Overridable via `DATABASE_URL`.
    pub database_url: String,

    /// Where to write the JSON run report. `None` disables the file (the
    /// report is still logged).
    #[serde(default)]
    pub report_path: Option<PathBuf>,

    /// Earliest date a full backfill starts from.
    #[serde(default = "default_backfill_start")]
    pub backfill_start: NaiveDate,

    /// Currency all prices are normalized into.
    #[serde(default = "default_reporting_currency")]
    pub reporting_currency: String,

    /// Retry envelope for provider calls.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Retry settings for provider calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts per symbol (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts, in seconds.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,

    /// Delay shape across retries.
    #[serde(default)]
    pub backoff: BackoffKind,
}

/// Serde-facing mirror of [`Backoff`].
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// Same delay before every retry.
    #[default]
    Fixed,
    /// Delay doubles with each retry.
    Exponential,
}

impl RetryConfig {
    /// Builds the policy value handed to the fetcher.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_secs(self.delay_secs),
            backoff: match self.backoff {
                BackoffKind::Fixed => Backoff::Fixed,
                BackoffKind::Exponential => Backoff::Exponential,
            },
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_delay_secs(),
            backoff: BackoffKind::Fixed,
        }
    }
}

fn default_backfill_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 12, 1).unwrap()
}

fn default_reporting_currency() -> String {
    "EUR".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_secs() -> u64 {
    60
}

/// Parses a configuration from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<PipelineConfig> {
    toml::from_str(toml_str).context("failed to parse pipeline config TOML")
}

/// Reads and parses a configuration TOML file from disk.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<PipelineConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
