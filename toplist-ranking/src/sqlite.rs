//! SQLite score store backend (rusqlite).
//!
//! rusqlite is blocking, so queries run on tokio's blocking pool with a
//! fresh read-only connection per fetch.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};
use toplist_core::types::RankedEntity;

use crate::error::RankingError;
use crate::query::{top_players_sql, Dialect};

/// Fetch the top `limit` rows from the SQLite database at `path`.
pub(crate) async fn fetch_top(
    path: PathBuf,
    table: String,
    limit: usize,
) -> Result<Vec<RankedEntity>, RankingError> {
    tokio::task::spawn_blocking(move || fetch_top_blocking(&path, &table, limit)).await?
}

/// Blocking variant of the SQLite fetch.
///
/// # Errors
///
/// Returns [`RankingError::Sqlite`] if the database cannot be opened or
/// queried, or [`RankingError::InvalidRow`] for out-of-range places.
pub fn fetch_top_blocking(
    path: &Path,
    table: &str,
    limit: usize,
) -> Result<Vec<RankedEntity>, RankingError> {
    let sql = top_players_sql(table, Dialect::Sqlite)?;
    let limit = i64::try_from(limit)
        .map_err(|_| RankingError::Config(format!("row limit {limit} out of range")))?;

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut ranked = Vec::new();
    for row in rows {
        let (name, score, place) = row?;
        let rank = u32::try_from(place).map_err(|_| {
            RankingError::InvalidRow(format!("place {place} for '{name}' out of range"))
        })?;
        ranked.push(RankedEntity { name, score, rank });
    }
    Ok(ranked)
}
