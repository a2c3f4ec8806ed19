//! Query construction for the chart endpoint.

use chrono::{NaiveDate, NaiveDateTime};

/// Builds the query pairs for a daily-interval chart request.
///
/// The endpoint takes half-open `[period1, period2)` unix-second bounds, so
/// the inclusive `end` date is widened by one day.
pub(super) fn chart_query(start: NaiveDate, end: NaiveDate) -> Vec<(String, String)> {
    let period1 = epoch_seconds(start);
    let period2 = epoch_seconds(end + chrono::Duration::days(1));
    vec![
        ("period1".to_string(), period1.to_string()),
        ("period2".to_string(), period2.to_string()),
        ("interval".to_string(), "1d".to_string()),
        ("events".to_string(), "history".to_string()),
    ]
}

fn epoch_seconds(date: NaiveDate) -> i64 {
    NaiveDateTime::from(date).and_utc().timestamp()
}
