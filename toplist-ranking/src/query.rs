//! Dense-rank leaderboard query.
//!
//! Both dialects compute `DENSE_RANK() OVER (ORDER BY points DESC)` over the
//! `k4ranks` table, so tied scores share a place and the next score takes
//! the next integer place.

use crate::error::RankingError;

/// SQL flavour of the score store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// MySQL / MariaDB (backtick identifiers, `?` placeholders).
    MySql,
    /// SQLite (double-quoted identifiers, `?1` placeholders).
    Sqlite,
}

/// Build the top-N query for `table`. The row limit is the only parameter.
///
/// # Errors
///
/// Returns [`RankingError::Config`] if `table` is not a plain identifier.
pub fn top_players_sql(table: &str, dialect: Dialect) -> Result<String, RankingError> {
    if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RankingError::Config(format!(
            "ranks table name '{table}' must match [A-Za-z0-9_]+"
        )));
    }

    let sql = match dialect {
        Dialect::MySql => format!(
            "WITH ranked_players AS (
                SELECT
                    steam_id,
                    name,
                    points,
                    DENSE_RANK() OVER (ORDER BY points DESC) AS player_place
                FROM `{table}`
            )
            SELECT
                name,
                CAST(points AS SIGNED) AS points,
                CAST(player_place AS SIGNED) AS player_place
            FROM ranked_players
            ORDER BY points DESC, name ASC
            LIMIT ?"
        ),
        Dialect::Sqlite => format!(
            "WITH ranked_players AS (
                SELECT
                    steam_id,
                    name,
                    points,
                    DENSE_RANK() OVER (ORDER BY points DESC) AS player_place
                FROM \"{table}\"
            )
            SELECT name, points, player_place
            FROM ranked_players
            ORDER BY points DESC, name ASC
            LIMIT ?1"
        ),
    };
    Ok(sql)
}
