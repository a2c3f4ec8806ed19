mod common;

use common::{date, seed_symbol, setup_db};
use etf_sync::bars::{bars_in_window, insert_bars, latest_close, set_eur_prices};
use etf_sync::models::EurPrices;
use etf_sync::validate::CleanBar;

fn clean(day: u32, close: f64) -> CleanBar {
    CleanBar {
        date: date(2024, 6, day),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 500,
    }
}

#[test]
fn reinserting_same_dates_is_a_no_op() {
    let (_db, mut conn) = setup_db();
    let id = seed_symbol(&mut conn, "VWCE.DE", "EUR");
    let batch = vec![clean(3, 100.0), clean(4, 101.0)];

    assert_eq!(insert_bars(&mut conn, id, &batch).unwrap(), 2);
    assert_eq!(insert_bars(&mut conn, id, &batch).unwrap(), 0);

    let stored = bars_in_window(&mut conn, id, date(2024, 6, 1), date(2024, 6, 30)).unwrap();
    assert_eq!(stored.len(), 2);
}

#[test]
fn conflict_never_clobbers_native_or_eur_columns() {
    let (_db, mut conn) = setup_db();
    let id = seed_symbol(&mut conn, "VWCE.DE", "USD");

    insert_bars(&mut conn, id, &[clean(3, 100.0)]).unwrap();
    set_eur_prices(
        &mut conn,
        id,
        date(2024, 6, 3),
        EurPrices {
            open_eur: 91.0,
            high_eur: 93.0,
            low_eur: 90.0,
            close_eur: 92.0,
        },
    )
    .unwrap();

    // A refetch serving different values for the same date changes nothing.
    let mut refetched = clean(3, 999.0);
    refetched.volume = 1;
    assert_eq!(insert_bars(&mut conn, id, &[refetched]).unwrap(), 0);

    let stored = bars_in_window(&mut conn, id, date(2024, 6, 3), date(2024, 6, 3)).unwrap();
    assert_eq!(stored[0].close, 100.0);
    assert_eq!(stored[0].volume, 500);
    assert_eq!(stored[0].close_eur, Some(92.0));
}

#[test]
fn partial_overlap_inserts_only_new_dates() {
    let (_db, mut conn) = setup_db();
    let id = seed_symbol(&mut conn, "VWCE.DE", "EUR");

    insert_bars(&mut conn, id, &[clean(3, 100.0), clean(4, 101.0)]).unwrap();
    let overlap = vec![clean(4, 101.0), clean(5, 102.0), clean(6, 103.0)];
    assert_eq!(insert_bars(&mut conn, id, &overlap).unwrap(), 2);

    let stored = bars_in_window(&mut conn, id, date(2024, 6, 1), date(2024, 6, 30)).unwrap();
    let dates: Vec<_> = stored.iter().map(|b| b.date).collect();
    assert_eq!(
        dates,
        vec![date(2024, 6, 3), date(2024, 6, 4), date(2024, 6, 5), date(2024, 6, 6)]
    );
}

#[test]
fn latest_close_tracks_newest_bar() {
    let (_db, mut conn) = setup_db();
    let id = seed_symbol(&mut conn, "VWCE.DE", "EUR");

    assert_eq!(latest_close(&mut conn, id).unwrap(), None);
    insert_bars(&mut conn, id, &[clean(3, 100.0), clean(5, 104.0), clean(4, 101.0)]).unwrap();
    assert_eq!(latest_close(&mut conn, id).unwrap(), Some(104.0));
}
