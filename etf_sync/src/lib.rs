//! Incremental ingestion and currency-normalization pipeline for daily ETF
//! price data.
//!
//! The crate ingests daily OHLCV bars for a configured set of instruments,
//! persists them idempotently in SQLite, converts native-currency prices to
//! the reporting currency (EUR) using a cache of historical exchange rates,
//! and recomputes rolling 52-week metrics. The [`pipeline`] module sequences
//! the steps and produces a structured run report.

#![deny(missing_docs)]

pub mod bars;
pub mod config;
pub mod db;
pub mod fetch;
pub mod fx;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod planner;
#[allow(missing_docs)]
pub mod schema;
pub mod symbols;
pub mod validate;
