//! Derived rolling metrics: 52-week high/low and decrease thresholds.
//!
//! Both tables use replace semantics keyed by (symbol, calculation_date), so
//! rerunning for the same date overwrites instead of appending.

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use diesel::prelude::*;

use crate::bars::bars_in_window;
use crate::models::{NewDecreaseThreshold, NewFiftyTwoWeekMetric, PriceBar};
use crate::schema::{decrease_thresholds::dsl as dt, fifty_two_week_metrics::dsl as ftw};

/// Percentage drops from the 52-week high that get a target price.
pub const DECREASE_STEPS: [u32; 5] = [10, 15, 20, 25, 30];

/// Length of the trailing window in calendar days (52 weeks).
pub const WINDOW_DAYS: i64 = 364;

/// Extremes of the close series over one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowExtremes {
    /// Highest close in the window.
    pub high: f64,
    /// Lowest close in the window.
    pub low: f64,
    /// First date the high occurred.
    pub high_date: NaiveDate,
    /// First date the low occurred.
    pub low_date: NaiveDate,
}

/// Effective close used for metrics: the normalized value when available,
/// the native one otherwise.
fn effective_close(bar: &PriceBar) -> f64 {
    bar.close_eur.unwrap_or(bar.close)
}

/// Scans bars (assumed date-ordered) for the close extremes.
///
/// Ties keep the first occurrence. Returns `None` for an empty window.
pub fn compute_extremes(bars: &[PriceBar]) -> Option<WindowExtremes> {
    let first = bars.first()?;
    let mut extremes = WindowExtremes {
        high: effective_close(first),
        low: effective_close(first),
        high_date: first.date,
        low_date: first.date,
    };
    for bar in &bars[1..] {
        let close = effective_close(bar);
        if close > extremes.high {
            extremes.high = close;
            extremes.high_date = bar.date;
        }
        if close < extremes.low {
            extremes.low = close;
            extremes.low_date = bar.date;
        }
    }
    Some(extremes)
}

/// Target price after a percentage drop from the high.
pub fn threshold_price(high: f64, pct: u32) -> f64 {
    high * (1.0 - f64::from(pct) / 100.0)
}

/// Recomputes and stores the 52-week metrics and decrease thresholds for one
/// symbol as of `calculation_date`.
///
/// The window is the trailing [`WINDOW_DAYS`]-day span ending at the
/// calculation date (inclusive). Returns `false` when the window holds no
/// bars, in which case nothing is written.
pub fn recalculate(
    conn: &mut SqliteConnection,
    symbol_id: i32,
    calculation_date: NaiveDate,
) -> anyhow::Result<bool> {
    let window_start = calculation_date - Duration::days(WINDOW_DAYS - 1);
    let bars = bars_in_window(conn, symbol_id, window_start, calculation_date)?;

    let Some(extremes) = compute_extremes(&bars) else {
        return Ok(false);
    };

    let metric = NewFiftyTwoWeekMetric {
        symbol_id,
        calculation_date,
        high: extremes.high,
        low: extremes.low,
        high_date: extremes.high_date,
        low_date: extremes.low_date,
    };
    let thresholds = NewDecreaseThreshold {
        symbol_id,
        calculation_date,
        high_price: extremes.high,
        decrease_10_price: threshold_price(extremes.high, 10),
        decrease_15_price: threshold_price(extremes.high, 15),
        decrease_20_price: threshold_price(extremes.high, 20),
        decrease_25_price: threshold_price(extremes.high, 25),
        decrease_30_price: threshold_price(extremes.high, 30),
    };

    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        diesel::insert_into(ftw::fifty_two_week_metrics)
            .values(&metric)
            .on_conflict((ftw::symbol_id, ftw::calculation_date))
            .do_update()
            .set(&metric)
            .execute(conn)?;

        diesel::insert_into(dt::decrease_thresholds)
            .values(&thresholds)
            .on_conflict((dt::symbol_id, dt::calculation_date))
            .do_update()
            .set(&thresholds)
            .execute(conn)?;
        Ok(())
    })
    .with_context(|| format!("store metrics for symbol {symbol_id} on {calculation_date}"))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bar(day: u32, close: f64, close_eur: Option<f64>) -> PriceBar {
        PriceBar {
            id: 0,
            symbol_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
            open_eur: close_eur,
            high_eur: close_eur,
            low_eur: close_eur,
            close_eur,
        }
    }

    #[test]
    fn empty_window_yields_none() {
        assert!(compute_extremes(&[]).is_none());
    }

    #[test]
    fn prefers_normalized_close() {
        let bars = vec![bar(3, 100.0, Some(90.0)), bar(4, 50.0, Some(95.0))];
        let e = compute_extremes(&bars).unwrap();
        // Native closes would rank day 3 highest; EUR closes rank day 4.
        assert_eq!(e.high, 95.0);
        assert_eq!(e.high_date, bars[1].date);
        assert_eq!(e.low, 90.0);
    }

    #[test]
    fn ties_keep_first_occurrence() {
        let bars = vec![bar(3, 100.0, None), bar(4, 100.0, None), bar(5, 100.0, None)];
        let e = compute_extremes(&bars).unwrap();
        assert_eq!(e.high_date, bars[0].date);
        assert_eq!(e.low_date, bars[0].date);
    }

    proptest! {
        #[test]
        fn thresholds_strictly_descend(high in 0.01f64..1_000_000.0) {
            let prices: Vec<f64> = DECREASE_STEPS
                .iter()
                .map(|&pct| threshold_price(high, pct))
                .collect();
            for pair in prices.windows(2) {
                prop_assert!(pair[0] > pair[1]);
            }
            for p in prices {
                prop_assert!(p <= high);
            }
        }
    }
}
