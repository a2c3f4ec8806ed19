//! Batch conversion of native-currency bars to the reporting currency.

use chrono::NaiveDate;
use diesel::SqliteConnection;
use market_feed::providers::RateProvider;
use tracing::{debug, warn};

use crate::bars::{bars_missing_eur, set_eur_prices};
use crate::fx::repo::{cached_rates, store_rates};
use crate::models::{EurPrices, PriceBar, Symbol};

/// Result of normalizing one symbol.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NormalizeOutcome {
    /// Bars whose EUR columns were populated.
    pub converted: usize,
    /// Dates that still have no rate after the provider call; their bars keep
    /// NULL EUR columns until a later run finds a rate.
    pub missing_rate_dates: Vec<NaiveDate>,
}

impl NormalizeOutcome {
    /// True when the symbol had no bars awaiting conversion.
    pub fn nothing_to_do(&self) -> bool {
        self.converted == 0 && self.missing_rate_dates.is_empty()
    }
}

/// Converts all bars of `symbol` that are still missing EUR fields.
///
/// Already-converted bars are never touched again: the selection is driven by
/// `close_eur IS NULL`, which makes re-runs no-ops. For symbols quoted in the
/// reporting currency the EUR columns are filled from the native values
/// directly. Otherwise any dates without a cached rate are fetched from the
/// provider in a single call covering the whole contiguous span, cached, and
/// then applied per bar. A date the provider has no fix for (FX weekend gap)
/// leaves that bar unconverted with a warning; this is not an error.
pub async fn normalize_symbol(
    conn: &mut SqliteConnection,
    rates: &(dyn RateProvider + Send + Sync),
    symbol: &Symbol,
    reporting_currency: &str,
) -> anyhow::Result<NormalizeOutcome> {
    let pending = bars_missing_eur(conn, symbol.id)?;
    if pending.is_empty() {
        debug!(ticker = %symbol.ticker, "no bars awaiting conversion");
        return Ok(NormalizeOutcome::default());
    }

    if symbol.currency == reporting_currency {
        return fill_native_as_reporting(conn, symbol, &pending);
    }

    // The window spans every pending date; bars are ordered oldest first.
    let start = pending[0].date;
    let end = pending[pending.len() - 1].date;

    let mut cached = cached_rates(conn, &symbol.currency, reporting_currency, start, end)?;
    let uncached: Vec<NaiveDate> = pending
        .iter()
        .map(|b| b.date)
        .filter(|d| !cached.contains_key(d))
        .collect();

    if let (Some(&first), Some(&last)) = (uncached.first(), uncached.last()) {
        // One ranged call for the whole uncovered span, not one per date.
        let points = rates
            .fetch_rates(&symbol.currency, reporting_currency, first, last)
            .await?;
        let added = store_rates(conn, &symbol.currency, reporting_currency, &points)?;
        debug!(
            pair = format!("{}->{}", symbol.currency, reporting_currency),
            span = %format!("{first}..{last}"),
            fetched = points.len(),
            cached = added,
            "filled rate cache"
        );
        cached = cached_rates(conn, &symbol.currency, reporting_currency, start, end)?;
    }

    let mut outcome = NormalizeOutcome::default();
    for bar in &pending {
        match cached.get(&bar.date) {
            Some(&rate) => {
                set_eur_prices(conn, symbol.id, bar.date, convert_bar(bar, rate))?;
                outcome.converted += 1;
            }
            None => {
                warn!(
                    ticker = %symbol.ticker,
                    date = %bar.date,
                    "no exchange rate for date, EUR fields left empty"
                );
                outcome.missing_rate_dates.push(bar.date);
            }
        }
    }
    Ok(outcome)
}

fn fill_native_as_reporting(
    conn: &mut SqliteConnection,
    symbol: &Symbol,
    pending: &[PriceBar],
) -> anyhow::Result<NormalizeOutcome> {
    for bar in pending {
        let prices = EurPrices {
            open_eur: bar.open,
            high_eur: bar.high,
            low_eur: bar.low,
            close_eur: bar.close,
        };
        set_eur_prices(conn, symbol.id, bar.date, prices)?;
    }
    Ok(NormalizeOutcome {
        converted: pending.len(),
        missing_rate_dates: Vec::new(),
    })
}

fn convert_bar(bar: &PriceBar, rate: f64) -> EurPrices {
    EurPrices {
        open_eur: round2(bar.open * rate),
        high_eur: round2(bar.high * rate),
        low_eur: round2(bar.low * rate),
        close_eur: round2(bar.close * rate),
    }
}

/// Rounds a display-grade EUR value to cents. The rate itself is cached at
/// full precision.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
