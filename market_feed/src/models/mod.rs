//! Canonical data models exchanged with providers.

pub mod bar;
pub mod rate;
pub mod request;
