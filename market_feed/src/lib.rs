//! Vendor-agnostic market data access.
//!
//! This crate defines the canonical in-memory models for daily OHLCV bars and
//! historical FX rate points, the async [`providers::DataProvider`] and
//! [`providers::RateProvider`] traits, a reqwest-based implementation against
//! the Yahoo chart REST endpoint, and the retry policy used to make provider
//! calls resilient to transient failures.

#![deny(missing_docs)]

pub mod models;
pub mod providers;
pub mod retry;
