//! MySQL score store backend (sqlx).
//!
//! Every fetch opens its own connection and closes it afterwards; no
//! connection state is shared between concurrent fetches.

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow, MySqlSslMode};
use sqlx::{Connection, Row};
use toplist_core::config::DatabaseConfig;
use toplist_core::types::RankedEntity;
use tracing::debug;

use crate::error::RankingError;
use crate::query::{top_players_sql, Dialect};

/// Map a configured TLS mode onto sqlx's. Case-insensitive; `none` means
/// disabled.
///
/// # Errors
///
/// Returns [`RankingError::Config`] for unknown modes.
pub fn parse_ssl_mode(mode: &str) -> Result<MySqlSslMode, RankingError> {
    let normalized = mode.trim().to_ascii_lowercase().replace(['-', '_'], "");
    match normalized.as_str() {
        "none" | "disabled" | "disable" => Ok(MySqlSslMode::Disabled),
        "preferred" | "prefer" => Ok(MySqlSslMode::Preferred),
        "required" | "require" => Ok(MySqlSslMode::Required),
        "verifyca" => Ok(MySqlSslMode::VerifyCa),
        "verifyidentity" | "verifyfull" => Ok(MySqlSslMode::VerifyIdentity),
        _ => Err(RankingError::Config(format!("unknown sslmode '{mode}'"))),
    }
}

/// Connection options for `config`.
///
/// # Errors
///
/// Returns [`RankingError::Config`] if the TLS mode is unknown.
pub fn connect_options(config: &DatabaseConfig) -> Result<MySqlConnectOptions, RankingError> {
    Ok(MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.username)
        .password(&config.password)
        .database(&config.database)
        .ssl_mode(parse_ssl_mode(&config.sslmode)?))
}

/// Fetch the top `limit` rows from the configured MySQL server.
pub(crate) async fn fetch_top(
    config: &DatabaseConfig,
    limit: usize,
) -> Result<Vec<RankedEntity>, RankingError> {
    let options = connect_options(config)?;
    let sql = top_players_sql(&config.ranks_table(), Dialect::MySql)?;
    let limit = i64::try_from(limit)
        .map_err(|_| RankingError::Config(format!("row limit {limit} out of range")))?;

    let mut conn = MySqlConnection::connect_with(&options).await?;
    let rows = sqlx::query(&sql).bind(limit).fetch_all(&mut conn).await;
    if let Err(e) = conn.close().await {
        debug!(error = %e, "Failed to close ranking connection cleanly");
    }

    rows?.iter().map(row_to_entity).collect()
}

fn row_to_entity(row: &MySqlRow) -> Result<RankedEntity, RankingError> {
    let name: String = row.try_get("name")?;
    let score: i64 = row.try_get("points")?;
    let place: i64 = row.try_get("player_place")?;
    let rank = u32::try_from(place)
        .map_err(|_| RankingError::InvalidRow(format!("place {place} for '{name}' out of range")))?;
    Ok(RankedEntity { name, score, rank })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssl_modes_parse_case_insensitively() {
        assert!(matches!(parse_ssl_mode("none"), Ok(MySqlSslMode::Disabled)));
        assert!(matches!(parse_ssl_mode("None"), Ok(MySqlSslMode::Disabled)));
        assert!(matches!(parse_ssl_mode("Preferred"), Ok(MySqlSslMode::Preferred)));
        assert!(matches!(parse_ssl_mode("REQUIRED"), Ok(MySqlSslMode::Required)));
        assert!(matches!(parse_ssl_mode("VerifyCA"), Ok(MySqlSslMode::VerifyCa)));
        assert!(matches!(parse_ssl_mode("verify_identity"), Ok(MySqlSslMode::VerifyIdentity)));
        assert!(matches!(parse_ssl_mode("VerifyFull"), Ok(MySqlSslMode::VerifyIdentity)));
    }

    #[test]
    fn unknown_ssl_mode_is_config_error() {
        assert!(matches!(parse_ssl_mode("sometimes"), Err(RankingError::Config(_))));
    }

    #[test]
    fn connect_options_accept_defaults() {
        assert!(connect_options(&DatabaseConfig::default()).is_ok());
    }
}
