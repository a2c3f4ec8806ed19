//! Incremental fetch planning.
//!
//! Decides, per symbol, which date window still needs bars. Weekends and
//! holidays get no special treatment here: asking the provider for a window
//! that turns out to contain no trading days is normal.

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use diesel::prelude::*;

use crate::schema::price_bars::dsl as pb;

/// The fetch window decided for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// No bars stored yet: fetch the full history from the backfill start.
    Backfill {
        /// First date to request (inclusive).
        start: NaiveDate,
        /// Last date to request (inclusive).
        end: NaiveDate,
    },
    /// Bars exist: fetch only the days after the latest stored date.
    Incremental {
        /// First date to request (inclusive).
        start: NaiveDate,
        /// Last date to request (inclusive).
        end: NaiveDate,
    },
    /// The latest stored date is already yesterday or later; nothing to do.
    UpToDate,
}

impl FetchPlan {
    /// The planned window, if any.
    pub fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            FetchPlan::Backfill { start, end } | FetchPlan::Incremental { start, end } => {
                Some((start, end))
            }
            FetchPlan::UpToDate => None,
        }
    }
}

/// Latest stored bar date for a symbol, if any bars exist.
pub fn latest_bar_date(
    conn: &mut SqliteConnection,
    symbol_id: i32,
) -> anyhow::Result<Option<NaiveDate>> {
    pb::price_bars
        .filter(pb::symbol_id.eq(symbol_id))
        .select(diesel::dsl::max(pb::date))
        .first(conn)
        .with_context(|| format!("latest bar date for symbol {symbol_id}"))
}

/// Computes the fetch window for a symbol.
///
/// Windows always end at `today - 1`: today's bar is still forming. A window
/// whose start would land after its end means the symbol is up to date; that
/// is a skip, never an error.
pub fn plan_fetch(
    conn: &mut SqliteConnection,
    symbol_id: i32,
    backfill_start: NaiveDate,
    today: NaiveDate,
) -> anyhow::Result<FetchPlan> {
    let yesterday = today - Duration::days(1);

    Ok(match latest_bar_date(conn, symbol_id)? {
        None => {
            if backfill_start > yesterday {
                FetchPlan::UpToDate
            } else {
                FetchPlan::Backfill {
                    start: backfill_start,
                    end: yesterday,
                }
            }
        }
        Some(latest) => {
            let start = latest + Duration::days(1);
            if start > yesterday {
                FetchPlan::UpToDate
            } else {
                FetchPlan::Incremental {
                    start,
                    end: yesterday,
                }
            }
        }
    })
}
