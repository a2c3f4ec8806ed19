//! Data quality screening for fetched bars.
//!
//! Screening filters and annotates; it never mutates values. Bars with
//! missing or negative fields are dropped with a warning, extreme single-day
//! moves are flagged but kept. Malformed provider payloads never reach this
//! layer: they fail earlier as decode errors.

use std::fmt;

use chrono::NaiveDate;
use market_feed::models::bar::RawBar;

/// Maximum tolerated single-day close-to-close move before flagging.
pub const EXTREME_MOVE_LIMIT: f64 = 0.50;

/// A bar that passed screening, with all fields present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanBar {
    /// Trading day of the bar.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Daily high.
    pub high: f64,
    /// Daily low.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Shares/units traded.
    pub volume: i64,
}

/// A quality finding for one bar. Rejections drop the bar; flags keep it.
#[derive(Debug, Clone, PartialEq)]
pub enum QualityIssue {
    /// A required field was null; the bar was rejected.
    MissingField {
        /// Date of the offending bar.
        date: NaiveDate,
        /// Name of the missing field.
        field: &'static str,
    },
    /// A price field was negative; the bar was rejected.
    NegativePrice {
        /// Date of the offending bar.
        date: NaiveDate,
        /// Name of the negative field.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
    /// Volume was negative; the bar was rejected.
    NegativeVolume {
        /// Date of the offending bar.
        date: NaiveDate,
        /// The offending value.
        value: i64,
    },
    /// Close moved more than [`EXTREME_MOVE_LIMIT`] vs the previous close;
    /// the bar was kept.
    ExtremeMove {
        /// Date of the flagged bar.
        date: NaiveDate,
        /// Relative change vs the previous close (e.g. 0.62 for +62%).
        change: f64,
    },
}

impl QualityIssue {
    /// Whether the issue caused the bar to be dropped.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, QualityIssue::ExtremeMove { .. })
    }
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityIssue::MissingField { date, field } => {
                write!(f, "{date}: missing {field}, bar dropped")
            }
            QualityIssue::NegativePrice { date, field, value } => {
                write!(f, "{date}: negative {field} ({value}), bar dropped")
            }
            QualityIssue::NegativeVolume { date, value } => {
                write!(f, "{date}: negative volume ({value}), bar dropped")
            }
            QualityIssue::ExtremeMove { date, change } => {
                write!(f, "{date}: extreme move {:+.1}% vs previous close", change * 100.0)
            }
        }
    }
}

/// Screens a batch of raw bars for one symbol.
///
/// `prev_close` carries the last stored close across the batch boundary so an
/// incremental fetch's first bar is checked against history too. Returns the
/// accepted bars (order preserved) and all findings.
pub fn screen_bars(
    bars: &[RawBar],
    prev_close: Option<f64>,
) -> (Vec<CleanBar>, Vec<QualityIssue>) {
    let mut accepted = Vec::with_capacity(bars.len());
    let mut issues = Vec::new();
    let mut last_close = prev_close;

    'bars: for bar in bars {
        let fields = [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ];

        for (name, value) in fields {
            match value {
                None => {
                    issues.push(QualityIssue::MissingField {
                        date: bar.date,
                        field: name,
                    });
                    continue 'bars;
                }
                Some(v) if v < 0.0 => {
                    issues.push(QualityIssue::NegativePrice {
                        date: bar.date,
                        field: name,
                        value: v,
                    });
                    continue 'bars;
                }
                Some(_) => {}
            }
        }

        let Some(volume) = bar.volume else {
            issues.push(QualityIssue::MissingField {
                date: bar.date,
                field: "volume",
            });
            continue;
        };
        if volume < 0 {
            issues.push(QualityIssue::NegativeVolume {
                date: bar.date,
                value: volume,
            });
            continue;
        }

        // Fields checked above; this destructure always succeeds.
        let (Some(open), Some(high), Some(low), Some(close)) =
            (bar.open, bar.high, bar.low, bar.close)
        else {
            continue;
        };
        if let Some(prev) = last_close {
            if prev > 0.0 {
                let change = close / prev - 1.0;
                if change.abs() > EXTREME_MOVE_LIMIT {
                    issues.push(QualityIssue::ExtremeMove {
                        date: bar.date,
                        change,
                    });
                }
            }
        }
        last_close = Some(close);

        accepted.push(CleanBar {
            date: bar.date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    (accepted, issues)
}
