//! Run orchestration.
//!
//! Drives the three steps (fetch, normalize, metrics) over the active symbol
//! set with per-symbol failure isolation: one symbol's provider outage or bad
//! payload is recorded in the run report and the run moves on. The only fatal
//! condition is failing to load the symbol directory itself; storage-open
//! failures are handled even earlier, by the binary.

pub mod report;

use chrono::NaiveDate;
use diesel::SqliteConnection;
use market_feed::providers::{DataProvider, RateProvider};
use tracing::{error, info, warn};

use crate::bars::{insert_bars, latest_close};
use crate::config::PipelineConfig;
use crate::fetch::fetch_window;
use crate::fx::normalize_symbol;
use crate::metrics::recalculate;
use crate::models::Symbol;
use crate::planner::{FetchPlan, plan_fetch};
use crate::symbols::active_symbols;
use crate::validate::screen_bars;

pub use report::{RunReport, RunState};

use report::StepRecorder;

/// Which part of the pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSelection {
    /// Fetch, normalize, then metrics.
    Full,
    /// Only fetch and store native bars.
    FetchOnly,
    /// Only convert stored bars to the reporting currency.
    NormalizeOnly,
    /// Only recompute the rolling metrics.
    MetricsOnly,
}

impl StepSelection {
    fn fetch(self) -> bool {
        matches!(self, Self::Full | Self::FetchOnly)
    }

    fn normalize(self) -> bool {
        matches!(self, Self::Full | Self::NormalizeOnly)
    }

    fn metrics(self) -> bool {
        matches!(self, Self::Full | Self::MetricsOnly)
    }
}

/// The pipeline: providers plus configuration. Storage is passed per run.
pub struct Pipeline<'a> {
    bars_provider: &'a (dyn DataProvider + Send + Sync),
    rate_provider: &'a (dyn RateProvider + Send + Sync),
    config: &'a PipelineConfig,
}

impl<'a> Pipeline<'a> {
    /// Assembles a pipeline over the given providers and configuration.
    pub fn new(
        bars_provider: &'a (dyn DataProvider + Send + Sync),
        rate_provider: &'a (dyn RateProvider + Send + Sync),
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            bars_provider,
            rate_provider,
            config,
        }
    }

    /// Runs the selected steps for all active symbols as of `today`.
    ///
    /// Always returns a report; per-symbol failures are recorded in it, and
    /// only an unreadable symbol directory aborts the run.
    pub async fn run(
        &self,
        conn: &mut SqliteConnection,
        today: NaiveDate,
        step: StepSelection,
    ) -> RunReport {
        let symbols = match active_symbols(conn) {
            Ok(symbols) => symbols,
            Err(err) => {
                error!(error = %format!("{err:#}"), "cannot load symbol directory");
                return RunReport::aborted(format!("cannot load symbol directory: {err:#}"));
            }
        };
        if symbols.is_empty() {
            warn!("symbol directory has no active symbols");
            return RunReport::aborted("no active symbols to process");
        }
        info!(symbols = symbols.len(), %today, ?step, "pipeline run starting");

        let mut report = RunReport::new();

        if step.fetch() {
            report.record_step("fetch", self.run_fetch(conn, &symbols, today).await);
        }
        if step.normalize() {
            report.record_step("normalize", self.run_normalize(conn, &symbols).await);
        }
        if step.metrics() {
            report.record_step("metrics", self.run_metrics(conn, &symbols, today));
        }

        report.finalize();
        match &report.state {
            RunState::CompletedAllOk => info!("pipeline run completed, all symbols ok"),
            RunState::CompletedWithPartialFailures { failed_symbols } => warn!(
                failed = failed_symbols.len(),
                symbols = ?failed_symbols,
                "pipeline run completed with failures"
            ),
            RunState::Aborted { error } => error!(%error, "pipeline run aborted"),
        }
        report
    }

    async fn run_fetch(
        &self,
        conn: &mut SqliteConnection,
        symbols: &[Symbol],
        today: NaiveDate,
    ) -> report::StepReport {
        let policy = self.config.retry.policy();
        let mut rec = StepRecorder::start();

        for symbol in symbols {
            let plan = match plan_fetch(conn, symbol.id, self.config.backfill_start, today) {
                Ok(plan) => plan,
                Err(err) => {
                    error!(ticker = %symbol.ticker, error = %format!("{err:#}"), "fetch planning failed");
                    rec.failed(&symbol.ticker, format!("planning: {err:#}"));
                    continue;
                }
            };

            let Some((start, end)) = plan.window() else {
                info!(ticker = %symbol.ticker, "already up to date");
                rec.skipped(&symbol.ticker, "up to date");
                continue;
            };
            let mode = match plan {
                FetchPlan::Backfill { .. } => "backfill",
                _ => "incremental",
            };
            info!(ticker = %symbol.ticker, mode, %start, %end, "fetching bars");

            let raw = match fetch_window(self.bars_provider, &symbol.ticker, start, end, &policy)
                .await
            {
                Ok(raw) => raw,
                Err(err) => {
                    error!(ticker = %symbol.ticker, error = %err, "fetch failed");
                    rec.failed(&symbol.ticker, err.to_string());
                    continue;
                }
            };

            let prev_close = match latest_close(conn, symbol.id) {
                Ok(close) => close,
                Err(err) => {
                    rec.failed(&symbol.ticker, format!("load previous close: {err:#}"));
                    continue;
                }
            };
            let (clean, issues) = screen_bars(&raw, prev_close);
            for issue in &issues {
                warn!(ticker = %symbol.ticker, "{issue}");
            }

            match insert_bars(conn, symbol.id, &clean) {
                Ok(inserted) => {
                    info!(
                        ticker = %symbol.ticker,
                        fetched = raw.len(),
                        accepted = clean.len(),
                        inserted,
                        "bars stored"
                    );
                    rec.success(&symbol.ticker);
                }
                Err(err) => {
                    error!(ticker = %symbol.ticker, error = %format!("{err:#}"), "storing bars failed");
                    rec.failed(&symbol.ticker, format!("store: {err:#}"));
                }
            }
        }

        rec.finish()
    }

    async fn run_normalize(
        &self,
        conn: &mut SqliteConnection,
        symbols: &[Symbol],
    ) -> report::StepReport {
        let mut rec = StepRecorder::start();

        for symbol in symbols {
            match normalize_symbol(
                conn,
                self.rate_provider,
                symbol,
                &self.config.reporting_currency,
            )
            .await
            {
                Ok(outcome) if outcome.nothing_to_do() => {
                    rec.skipped(&symbol.ticker, "nothing pending");
                }
                Ok(outcome) => {
                    info!(
                        ticker = %symbol.ticker,
                        converted = outcome.converted,
                        missing_rates = outcome.missing_rate_dates.len(),
                        "normalization done"
                    );
                    rec.success(&symbol.ticker);
                }
                Err(err) => {
                    error!(ticker = %symbol.ticker, error = %format!("{err:#}"), "normalization failed");
                    rec.failed(&symbol.ticker, format!("{err:#}"));
                }
            }
        }

        rec.finish()
    }

    fn run_metrics(
        &self,
        conn: &mut SqliteConnection,
        symbols: &[Symbol],
        today: NaiveDate,
    ) -> report::StepReport {
        let mut rec = StepRecorder::start();

        for symbol in symbols {
            match recalculate(conn, symbol.id, today) {
                Ok(true) => {
                    info!(ticker = %symbol.ticker, "metrics recalculated");
                    rec.success(&symbol.ticker);
                }
                Ok(false) => {
                    warn!(ticker = %symbol.ticker, "no bars in trailing window");
                    rec.skipped(&symbol.ticker, "no bars in window");
                }
                Err(err) => {
                    error!(ticker = %symbol.ticker, error = %format!("{err:#}"), "metrics failed");
                    rec.failed(&symbol.ticker, format!("{err:#}"));
                }
            }
        }

        rec.finish()
    }
}
