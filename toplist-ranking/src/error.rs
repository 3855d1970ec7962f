//! Ranking error types.

use thiserror::Error;

/// Errors that can occur while fetching rankings.
#[derive(Debug, Error)]
pub enum RankingError {
    /// MySQL connection or query failed.
    #[error("MySQL ranking query failed: {0}")]
    MySql(#[from] sqlx::Error),

    /// SQLite connection or query failed.
    #[error("SQLite ranking query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection settings are unusable.
    #[error("Ranking configuration error: {0}")]
    Config(String),

    /// A returned row could not be turned into a ranked entity.
    #[error("Invalid ranking row: {0}")]
    InvalidRow(String),

    /// No score store is configured.
    #[error("Ranking source unavailable: {0}")]
    Unavailable(String),

    /// The blocking query task panicked or was cancelled.
    #[error("Ranking task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for RankingError {
    fn from(err: tokio::task::JoinError) -> Self {
        RankingError::Join(err.to_string())
    }
}
