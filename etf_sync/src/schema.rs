//! Diesel table definitions for the pipeline database.

diesel::table! {
    symbols (id) {
        id -> Integer,
        isin -> Text,
        ticker -> Text,
        name -> Text,
        asset_type -> Text,
        exchange -> Text,
        currency -> Text,
        is_active -> Bool,
    }
}

diesel::table! {
    price_bars (id) {
        id -> Integer,
        symbol_id -> Integer,
        date -> Date,
        open -> Double,
        high -> Double,
        low -> Double,
        close -> Double,
        volume -> BigInt,
        open_eur -> Nullable<Double>,
        high_eur -> Nullable<Double>,
        low_eur -> Nullable<Double>,
        close_eur -> Nullable<Double>,
    }
}

diesel::table! {
    exchange_rates (id) {
        id -> Integer,
        from_currency -> Text,
        to_currency -> Text,
        rate_date -> Date,
        rate -> Double,
    }
}

diesel::table! {
    fifty_two_week_metrics (id) {
        id -> Integer,
        symbol_id -> Integer,
        calculation_date -> Date,
        high -> Double,
        low -> Double,
        high_date -> Date,
        low_date -> Date,
    }
}

diesel::table! {
    decrease_thresholds (id) {
        id -> Integer,
        symbol_id -> Integer,
        calculation_date -> Date,
        high_price -> Double,
        decrease_10_price -> Double,
        decrease_15_price -> Double,
        decrease_20_price -> Double,
        decrease_25_price -> Double,
        decrease_30_price -> Double,
    }
}

diesel::joinable!(price_bars -> symbols (symbol_id));
diesel::joinable!(fifty_two_week_metrics -> symbols (symbol_id));
diesel::joinable!(decrease_thresholds -> symbols (symbol_id));

diesel::allow_tables_to_appear_in_same_query!(
    symbols,
    price_bars,
    exchange_rates,
    fifty_two_week_metrics,
    decrease_thresholds,
);
