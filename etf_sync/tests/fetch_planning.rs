mod common;

use common::{date, seed_symbol, setup_db};
use etf_sync::bars::insert_bars;
use etf_sync::planner::{FetchPlan, plan_fetch};
use etf_sync::validate::CleanBar;

fn clean(day: u32, close: f64) -> CleanBar {
    CleanBar {
        date: date(2024, 6, day),
        open: close,
        high: close,
        low: close,
        close,
        volume: 100,
    }
}

#[test]
fn fresh_symbol_plans_full_backfill() {
    let (_db, mut conn) = setup_db();
    let id = seed_symbol(&mut conn, "VWCE.DE", "EUR");

    let plan = plan_fetch(&mut conn, id, date(2021, 12, 1), date(2024, 6, 10)).unwrap();
    assert_eq!(
        plan,
        FetchPlan::Backfill {
            start: date(2021, 12, 1),
            end: date(2024, 6, 9),
        }
    );
}

#[test]
fn stored_bars_plan_incremental_from_next_day() {
    let (_db, mut conn) = setup_db();
    let id = seed_symbol(&mut conn, "VWCE.DE", "EUR");
    insert_bars(&mut conn, id, &[clean(3, 100.0), clean(4, 101.0)]).unwrap();

    let plan = plan_fetch(&mut conn, id, date(2021, 12, 1), date(2024, 6, 10)).unwrap();
    assert_eq!(
        plan,
        FetchPlan::Incremental {
            start: date(2024, 6, 5),
            end: date(2024, 6, 9),
        }
    );
}

#[test]
fn latest_bar_yesterday_means_up_to_date() {
    let (_db, mut conn) = setup_db();
    let id = seed_symbol(&mut conn, "VWCE.DE", "EUR");
    insert_bars(&mut conn, id, &[clean(9, 100.0)]).unwrap();

    let plan = plan_fetch(&mut conn, id, date(2021, 12, 1), date(2024, 6, 10)).unwrap();
    assert_eq!(plan, FetchPlan::UpToDate);
}

#[test]
fn latest_bar_today_means_up_to_date_too() {
    let (_db, mut conn) = setup_db();
    let id = seed_symbol(&mut conn, "VWCE.DE", "EUR");
    insert_bars(&mut conn, id, &[clean(10, 100.0)]).unwrap();

    let plan = plan_fetch(&mut conn, id, date(2021, 12, 1), date(2024, 6, 10)).unwrap();
    assert_eq!(plan, FetchPlan::UpToDate);
}

#[test]
fn future_backfill_start_is_a_skip_not_an_error() {
    let (_db, mut conn) = setup_db();
    let id = seed_symbol(&mut conn, "VWCE.DE", "EUR");

    let plan = plan_fetch(&mut conn, id, date(2024, 7, 1), date(2024, 6, 10)).unwrap();
    assert_eq!(plan, FetchPlan::UpToDate);
}
