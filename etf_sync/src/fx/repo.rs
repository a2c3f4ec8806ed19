//! Keyed store for historical exchange rates.

use std::collections::BTreeMap;

use anyhow::Context;
use chrono::NaiveDate;
use diesel::prelude::*;
use market_feed::models::rate::RatePoint;

use crate::models::NewExchangeRate;
use crate::schema::exchange_rates::dsl as xr;

/// Loads cached rates for a pair over an inclusive date window.
pub fn cached_rates(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<BTreeMap<NaiveDate, f64>> {
    let rows: Vec<(NaiveDate, f64)> = xr::exchange_rates
        .filter(xr::from_currency.eq(from))
        .filter(xr::to_currency.eq(to))
        .filter(xr::rate_date.ge(start))
        .filter(xr::rate_date.le(end))
        .select((xr::rate_date, xr::rate))
        .load(conn)
        .with_context(|| format!("load cached rates {from}->{to}"))?;

    Ok(rows.into_iter().collect())
}

/// Stores fetched rate points with insert-if-absent semantics.
///
/// A rate already cached for a (pair, date) wins over a newly fetched one:
/// historical rates are immutable facts, so a conflict is a no-op rather than
/// an overwrite. Returns the number of genuinely new rows.
pub fn store_rates(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
    points: &[RatePoint],
) -> anyhow::Result<usize> {
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let mut inserted = 0;
        for point in points {
            let row = NewExchangeRate {
                from_currency: from,
                to_currency: to,
                rate_date: point.date,
                rate: point.rate,
            };
            inserted += diesel::insert_into(xr::exchange_rates)
                .values(&row)
                .on_conflict((xr::from_currency, xr::to_currency, xr::rate_date))
                .do_nothing()
                .execute(conn)?;
        }
        Ok(inserted)
    })
    .with_context(|| format!("store rates {from}->{to}"))
}
