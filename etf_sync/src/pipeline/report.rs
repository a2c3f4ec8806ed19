//! Structured run report.
//!
//! Every run produces one [`RunReport`], even when it aborts before touching a
//! single symbol. The report is logged at the end of the run and optionally
//! written to disk as JSON for dashboards to pick up.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// How one symbol fared within a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The step did its work for this symbol.
    Success,
    /// There was nothing to do (already up to date, nothing pending).
    Skipped,
    /// The step failed for this symbol; the run continued with the rest.
    Failed,
}

/// Aggregate status of a step across all its symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// No symbol failed.
    Ok,
    /// Some symbols failed, some succeeded or were skipped.
    Partial,
    /// Every symbol failed.
    Failed,
}

/// Per-symbol entry inside a step.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolOutcome {
    /// Ticker the entry refers to.
    pub symbol: String,
    /// What happened.
    pub outcome: Outcome,
    /// Human-readable detail: the error for failures, the reason for skips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One pipeline step and its per-symbol outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// When the step started.
    pub started_at: DateTime<Utc>,
    /// When the step finished.
    pub finished_at: DateTime<Utc>,
    /// Aggregate status derived from the symbol outcomes.
    pub status: StepStatus,
    /// Outcome per symbol, in processing order.
    pub symbols: Vec<SymbolOutcome>,
}

/// Builder for a [`StepReport`]; records outcomes as the step walks symbols.
#[derive(Debug)]
pub struct StepRecorder {
    started_at: DateTime<Utc>,
    symbols: Vec<SymbolOutcome>,
}

impl StepRecorder {
    /// Starts timing a new step.
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            symbols: Vec::new(),
        }
    }

    /// Records a successful symbol.
    pub fn success(&mut self, symbol: &str) {
        self.symbols.push(SymbolOutcome {
            symbol: symbol.to_string(),
            outcome: Outcome::Success,
            reason: None,
        });
    }

    /// Records a symbol that needed no work.
    pub fn skipped(&mut self, symbol: &str, reason: impl Into<String>) {
        self.symbols.push(SymbolOutcome {
            symbol: symbol.to_string(),
            outcome: Outcome::Skipped,
            reason: Some(reason.into()),
        });
    }

    /// Records a failed symbol with its error text.
    pub fn failed(&mut self, symbol: &str, reason: impl Into<String>) {
        self.symbols.push(SymbolOutcome {
            symbol: symbol.to_string(),
            outcome: Outcome::Failed,
            reason: Some(reason.into()),
        });
    }

    /// Tickers that failed so far in this step.
    pub fn failed_symbols(&self) -> Vec<String> {
        self.symbols
            .iter()
            .filter(|s| s.outcome == Outcome::Failed)
            .map(|s| s.symbol.clone())
            .collect()
    }

    /// Closes the step, deriving its aggregate status.
    pub fn finish(self) -> StepReport {
        let any_failed = self.symbols.iter().any(|s| s.outcome == Outcome::Failed);
        let all_failed = !self.symbols.is_empty()
            && self.symbols.iter().all(|s| s.outcome == Outcome::Failed);
        let status = if all_failed {
            StepStatus::Failed
        } else if any_failed {
            StepStatus::Partial
        } else {
            StepStatus::Ok
        };
        StepReport {
            started_at: self.started_at,
            finished_at: Utc::now(),
            status,
            symbols: self.symbols,
        }
    }
}

/// Terminal state of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunState {
    /// Every step finished with no symbol failures.
    CompletedAllOk,
    /// The run finished but some symbols failed in at least one step.
    CompletedWithPartialFailures {
        /// Deduplicated tickers that failed anywhere.
        failed_symbols: Vec<String>,
    },
    /// The run could not proceed at all (storage unavailable, no symbols).
    Aborted {
        /// What stopped the run.
        error: String,
    },
}

/// Full account of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Step reports keyed by step name, in execution order.
    pub steps: IndexMap<String, StepReport>,
    /// Terminal state.
    pub state: RunState,
}

impl RunReport {
    /// Starts an empty report; [`finalize`](Self::finalize) derives the state.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            steps: IndexMap::new(),
            state: RunState::CompletedAllOk,
        }
    }

    /// A report for a run that never got going.
    pub fn aborted(error: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.state = RunState::Aborted {
            error: error.into(),
        };
        report.finished_at = Utc::now();
        report
    }

    /// Adds a completed step under `name`.
    pub fn record_step(&mut self, name: &str, step: StepReport) {
        self.steps.insert(name.to_string(), step);
    }

    /// Stamps the finish time and derives the terminal state from the steps.
    pub fn finalize(&mut self) {
        self.finished_at = Utc::now();
        let mut failed: Vec<String> = Vec::new();
        for step in self.steps.values() {
            for sym in &step.symbols {
                if sym.outcome == Outcome::Failed && !failed.contains(&sym.symbol) {
                    failed.push(sym.symbol.clone());
                }
            }
        }
        self.state = if failed.is_empty() {
            RunState::CompletedAllOk
        } else {
            RunState::CompletedWithPartialFailures {
                failed_symbols: failed,
            }
        };
    }

    /// True unless the run completed with every symbol clean.
    pub fn has_failures(&self) -> bool {
        !matches!(self.state, RunState::CompletedAllOk)
    }

    /// Writes the report as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create report directory {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self).context("serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("write run report to {}", path.display()))
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_status_aggregates_outcomes() {
        let mut rec = StepRecorder::start();
        rec.success("VWCE.DE");
        rec.skipped("IWDA.AS", "up to date");
        assert_eq!(rec.finish().status, StepStatus::Ok);

        let mut rec = StepRecorder::start();
        rec.success("VWCE.DE");
        rec.failed("IWDA.AS", "boom");
        assert_eq!(rec.finish().status, StepStatus::Partial);

        let mut rec = StepRecorder::start();
        rec.failed("VWCE.DE", "boom");
        assert_eq!(rec.finish().status, StepStatus::Failed);
    }

    #[test]
    fn finalize_collects_failed_symbols_once() {
        let mut report = RunReport::new();

        let mut fetch = StepRecorder::start();
        fetch.failed("IWDA.AS", "network");
        fetch.success("VWCE.DE");
        report.record_step("fetch", fetch.finish());

        let mut metrics = StepRecorder::start();
        metrics.failed("IWDA.AS", "no bars");
        report.record_step("metrics", metrics.finish());

        report.finalize();
        assert_eq!(
            report.state,
            RunState::CompletedWithPartialFailures {
                failed_symbols: vec!["IWDA.AS".to_string()]
            }
        );
        assert!(report.has_failures());
    }

    #[test]
    fn clean_run_is_all_ok() {
        let mut report = RunReport::new();
        let mut step = StepRecorder::start();
        step.success("VWCE.DE");
        report.record_step("fetch", step.finish());
        report.finalize();
        assert_eq!(report.state, RunState::CompletedAllOk);
        assert!(!report.has_failures());
    }

    #[test]
    fn report_serializes_steps_in_order() {
        let mut report = RunReport::new();
        report.record_step("fetch", StepRecorder::start().finish());
        report.record_step("normalize", StepRecorder::start().finish());
        report.finalize();

        let json = serde_json::to_string(&report).unwrap();
        let fetch_pos = json.find("\"fetch\"").unwrap();
        let norm_pos = json.find("\"normalize\"").unwrap();
        assert!(fetch_pos < norm_pos);
        assert!(json.contains("\"kind\":\"completed_all_ok\""));
    }

    #[test]
    fn aborted_report_carries_the_error() {
        let report = RunReport::aborted("unable to open database");
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"kind\":\"aborted\""));
        assert!(json.contains("unable to open database"));
    }
}
