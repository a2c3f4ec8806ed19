//! Idempotent persistence of price bars.
//!
//! The `(symbol_id, date)` UNIQUE constraint in the schema is the actual
//! idempotence mechanism; the insert path simply rides it with
//! `ON CONFLICT .. DO NOTHING`. Re-inserting a native row therefore can never
//! clobber anything — in particular, EUR columns populated by a previous
//! normalization pass survive re-runs of the same fetch.

use anyhow::Context;
use chrono::NaiveDate;
use diesel::prelude::*;

use crate::models::{EurPrices, NewPriceBar, PriceBar};
use crate::schema::price_bars::dsl as pb;
use crate::validate::CleanBar;

/// Inserts screened bars for a symbol, skipping dates already present.
///
/// Runs in a single immediate transaction and returns the number of genuinely
/// new rows.
pub fn insert_bars(
    conn: &mut SqliteConnection,
    symbol_id: i32,
    bars: &[CleanBar],
) -> anyhow::Result<usize> {
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let mut inserted = 0;
        for bar in bars {
            let row = NewPriceBar {
                symbol_id,
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            };
            inserted += diesel::insert_into(pb::price_bars)
                .values(&row)
                .on_conflict((pb::symbol_id, pb::date))
                .do_nothing()
                .execute(conn)?;
        }
        Ok(inserted)
    })
    .with_context(|| format!("insert bars for symbol {symbol_id}"))
}

/// Close of the latest stored bar, used to chain the extreme-move check
/// across an incremental fetch boundary.
pub fn latest_close(conn: &mut SqliteConnection, symbol_id: i32) -> anyhow::Result<Option<f64>> {
    pb::price_bars
        .filter(pb::symbol_id.eq(symbol_id))
        .order(pb::date.desc())
        .select(pb::close)
        .first(conn)
        .optional()
        .with_context(|| format!("latest close for symbol {symbol_id}"))
}

/// Bars whose EUR columns have not been populated yet, oldest first.
pub fn bars_missing_eur(
    conn: &mut SqliteConnection,
    symbol_id: i32,
) -> anyhow::Result<Vec<PriceBar>> {
    pb::price_bars
        .filter(pb::symbol_id.eq(symbol_id))
        .filter(pb::close_eur.is_null())
        .order(pb::date.asc())
        .select(PriceBar::as_select())
        .load(conn)
        .with_context(|| format!("bars missing EUR for symbol {symbol_id}"))
}

/// Bars inside an inclusive date window, oldest first.
pub fn bars_in_window(
    conn: &mut SqliteConnection,
    symbol_id: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<PriceBar>> {
    pb::price_bars
        .filter(pb::symbol_id.eq(symbol_id))
        .filter(pb::date.ge(start))
        .filter(pb::date.le(end))
        .order(pb::date.asc())
        .select(PriceBar::as_select())
        .load(conn)
        .with_context(|| format!("bars in window for symbol {symbol_id}"))
}

/// Writes the EUR columns of one bar. Native columns are unreachable through
/// the [`EurPrices`] changeset, keeping them immutable by construction.
pub fn set_eur_prices(
    conn: &mut SqliteConnection,
    symbol_id: i32,
    date: NaiveDate,
    prices: EurPrices,
) -> anyhow::Result<usize> {
    diesel::update(
        pb::price_bars.filter(pb::symbol_id.eq(symbol_id).and(pb::date.eq(date))),
    )
    .set(prices)
    .execute(conn)
    .with_context(|| format!("set EUR prices for symbol {symbol_id} on {date}"))
}
