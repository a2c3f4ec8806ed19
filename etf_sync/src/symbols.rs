//! Read access to the instrument directory.
//!
//! The `symbols` table is owned by the symbol loader (an external
//! collaborator); during a pipeline run it is treated as immutable input.

use anyhow::Context;
use diesel::prelude::*;

use crate::models::{NewSymbol, Symbol};
use crate::schema::symbols::dsl as sym;

/// Loads all active symbols, ordered by name.
pub fn active_symbols(conn: &mut SqliteConnection) -> anyhow::Result<Vec<Symbol>> {
    sym::symbols
        .filter(sym::is_active.eq(true))
        .order(sym::name.asc())
        .select(Symbol::as_select())
        .load(conn)
        .context("load active symbols")
}

/// Inserts a symbol row and returns its id. Seeding/test helper; the pipeline
/// itself never writes to the directory.
pub fn insert_symbol(conn: &mut SqliteConnection, row: &NewSymbol<'_>) -> anyhow::Result<i32> {
    diesel::insert_into(sym::symbols)
        .values(row)
        .returning(sym::id)
        .get_result(conn)
        .with_context(|| format!("insert symbol {}", row.ticker))
}
