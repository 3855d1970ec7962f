//! Ranking client over the MySQL and SQLite score stores.

use std::path::PathBuf;
use std::time::Instant;

use toplist_core::config::{DatabaseBackend, DatabaseConfig};
use toplist_core::types::RankedEntity;
use tracing::{debug, error};

use crate::error::RankingError;
use crate::{mysql, sqlite};

/// Where rankings come from.
#[derive(Debug, Clone)]
pub enum RankingBackend {
    /// Remote MySQL server.
    MySql(DatabaseConfig),
    /// Local SQLite database file.
    Sqlite { path: PathBuf, table: String },
    /// No score store. Every fetch fails and callers show a title-only display.
    None,
}

/// Fetches ordered, dense-ranked top-N lists.
///
/// Cheap to clone; holds only connection settings. Each fetch opens and
/// closes its own connection, so concurrent fetches are independent.
#[derive(Debug, Clone)]
pub struct RankingClient {
    backend: RankingBackend,
}

impl RankingClient {
    /// Create a client for `backend`.
    #[must_use]
    pub fn new(backend: RankingBackend) -> Self {
        Self { backend }
    }

    /// Create a client from `[database]`.
    #[must_use]
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let backend = match config.backend {
            DatabaseBackend::Mysql => RankingBackend::MySql(config.clone()),
            DatabaseBackend::Sqlite => RankingBackend::Sqlite {
                path: config.sqlite_path.clone(),
                table: config.ranks_table(),
            },
        };
        Self::new(backend)
    }

    /// Create a client with no score store.
    #[must_use]
    pub fn none() -> Self {
        Self::new(RankingBackend::None)
    }

    /// Check if a score store is configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.backend, RankingBackend::None)
    }

    /// Fetch up to `limit` entities ordered by score, descending.
    ///
    /// # Errors
    ///
    /// Returns [`RankingError`] if the store is unreachable, the query
    /// fails or a row is malformed.
    pub async fn fetch_top(&self, limit: usize) -> Result<Vec<RankedEntity>, RankingError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let ranked = match &self.backend {
            RankingBackend::None => {
                return Err(RankingError::Unavailable("No score store configured".into()));
            }
            RankingBackend::MySql(config) => mysql::fetch_top(config, limit).await?,
            RankingBackend::Sqlite { path, table } => {
                sqlite::fetch_top(path.clone(), table.clone(), limit).await?
            }
        };

        for entity in &ranked {
            debug!(
                "Player {} is on place {} with {} points",
                entity.name, entity.rank, entity.score
            );
        }
        debug!(
            rows = ranked.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Fetched top players"
        );
        Ok(ranked)
    }

    /// Like [`RankingClient::fetch_top`], but failures are logged and
    /// resolve to an empty list.
    pub async fn fetch_top_or_empty(&self, limit: usize) -> Vec<RankedEntity> {
        match self.fetch_top(limit).await {
            Ok(ranked) => ranked,
            Err(e) => {
                error!(error = %e, "Failed to retrieve top players");
                Vec::new()
            }
        }
    }
}
