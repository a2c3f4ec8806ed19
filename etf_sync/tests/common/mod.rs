#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use tempfile::TempDir;

use etf_sync::config::{BackoffKind, PipelineConfig, RetryConfig};
use etf_sync::db::{connection, migrate};
use etf_sync::models::NewSymbol;
use etf_sync::symbols::insert_symbol;
use market_feed::models::{bar::RawBar, rate::RatePoint, request::BarsRequest};
use market_feed::providers::{DataProvider, ProviderError, RateProvider};

pub struct TestDb {
    _dir: TempDir, // keep alive for the life of the test
    pub path: String,
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_sqlite(&path).expect("migrations");
    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn seed_symbol(conn: &mut SqliteConnection, ticker: &str, currency: &str) -> i32 {
    let isin = format!("IE00TEST{ticker}");
    insert_symbol(
        conn,
        &NewSymbol {
            isin: &isin,
            ticker,
            name: ticker,
            asset_type: "ETF",
            exchange: "XET",
            currency,
            is_active: true,
        },
    )
    .expect("seed symbol")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn raw_bar(date: NaiveDate, close: f64) -> RawBar {
    RawBar {
        date,
        open: Some(close - 1.0),
        high: Some(close + 1.0),
        low: Some(close - 2.0),
        close: Some(close),
        volume: Some(1_000),
    }
}

/// Config for tests: no retry sleeps, single attempt unless scripted otherwise.
pub fn test_config(database_url: &str, backfill_start: NaiveDate) -> PipelineConfig {
    PipelineConfig {
        database_url: database_url.to_string(),
        report_path: None,
        backfill_start,
        reporting_currency: "EUR".to_string(),
        retry: RetryConfig {
            max_attempts: 1,
            delay_secs: 0,
            backoff: BackoffKind::Fixed,
        },
    }
}

/// Bar provider that replays scripted responses in order. Once the script is
/// exhausted it answers with empty windows.
#[derive(Default)]
pub struct ScriptedBars {
    responses: Mutex<VecDeque<Result<Vec<RawBar>, ProviderError>>>,
    pub calls: Mutex<Vec<BarsRequest>>,
}

impl ScriptedBars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, bars: Vec<RawBar>) {
        self.responses.lock().unwrap().push_back(Ok(bars));
    }

    pub fn push_err(&self, err: ProviderError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DataProvider for ScriptedBars {
    async fn fetch_daily_bars(&self, request: &BarsRequest) -> Result<Vec<RawBar>, ProviderError> {
        self.calls.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(vec![]))
    }
}

/// Rate provider counterpart of [`ScriptedBars`].
#[derive(Default)]
pub struct ScriptedRates {
    responses: Mutex<VecDeque<Result<Vec<RatePoint>, ProviderError>>>,
    pub calls: Mutex<Vec<(String, String, NaiveDate, NaiveDate)>>,
}

impl ScriptedRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, points: Vec<RatePoint>) {
        self.responses.lock().unwrap().push_back(Ok(points));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RateProvider for ScriptedRates {
    async fn fetch_rates(
        &self,
        from: &str,
        to: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((from.to_string(), to.to_string(), start, end));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(vec![]))
    }
}
