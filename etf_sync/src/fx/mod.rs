//! Exchange rate cache and currency normalization.
//!
//! [`repo`] is the keyed rate store: rates are immutable facts per
//! (pair, date), inserted if absent and never recomputed. [`normalize`]
//! converts stored native-currency bars to the reporting currency in batch,
//! fetching any uncached rates for the whole contiguous date span in one
//! provider call.

pub mod normalize;
pub mod repo;

pub use normalize::{NormalizeOutcome, normalize_symbol};
