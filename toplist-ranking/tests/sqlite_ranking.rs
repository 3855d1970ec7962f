//! Ranking client against real SQLite score databases.

use std::path::Path;

use rusqlite::{params, Connection};
use toplist_core::config::{DatabaseBackend, DatabaseConfig};
use toplist_core::types::RankedEntity;
use toplist_ranking::{RankingBackend, RankingClient, RankingError};

fn seed(path: &Path, table: &str, rows: &[(&str, &str, i64)]) {
    let conn = Connection::open(path).expect("open");
    conn.execute_batch(&format!(
        "CREATE TABLE \"{table}\" (
            steam_id TEXT PRIMARY KEY,
            name     TEXT NOT NULL,
            points   INTEGER NOT NULL
        );"
    ))
    .expect("schema");
    for (steam_id, name, points) in rows {
        conn.execute(
            &format!("INSERT INTO \"{table}\" (steam_id, name, points) VALUES (?1, ?2, ?3)"),
            params![steam_id, name, points],
        )
        .expect("insert");
    }
}

fn sqlite_client(path: &Path, prefix: &str) -> RankingClient {
    RankingClient::from_config(&DatabaseConfig {
        backend: DatabaseBackend::Sqlite,
        sqlite_path: path.to_path_buf(),
        table_prefix: prefix.to_string(),
        ..DatabaseConfig::default()
    })
}

#[tokio::test]
async fn ties_share_a_dense_rank() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("ranks.db");
    seed(
        &db,
        "k4ranks",
        &[
            ("1", "alice", 1500),
            ("2", "bob", 1500),
            ("3", "carol", 1200),
            ("4", "dave", 900),
        ],
    );

    let ranked = sqlite_client(&db, "").fetch_top(5).await.expect("fetch");

    assert_eq!(
        ranked,
        vec![
            RankedEntity::new("alice", 1500, 1),
            RankedEntity::new("bob", 1500, 1),
            RankedEntity::new("carol", 1200, 2),
            RankedEntity::new("dave", 900, 3),
        ]
    );
}

#[tokio::test]
async fn limit_truncates_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("ranks.db");
    seed(
        &db,
        "k4ranks",
        &[("1", "a", 10), ("2", "b", 20), ("3", "c", 30), ("4", "d", 40)],
    );

    let ranked = sqlite_client(&db, "").fetch_top(2).await.expect("fetch");
    let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["d", "c"]);
}

#[tokio::test]
async fn table_prefix_is_applied() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("ranks.db");
    seed(&db, "cs2_k4ranks", &[("1", "zed", 77)]);

    let ranked = sqlite_client(&db, "cs2_").fetch_top(5).await.expect("fetch");
    assert_eq!(ranked, vec![RankedEntity::new("zed", 77, 1)]);
}

#[tokio::test]
async fn zero_limit_skips_io() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("does-not-exist.db");
    let ranked = sqlite_client(&missing, "").fetch_top(0).await.expect("no io");
    assert!(ranked.is_empty());
}

#[tokio::test]
async fn missing_database_degrades_to_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = sqlite_client(&dir.path().join("missing.db"), "");

    assert!(matches!(client.fetch_top(5).await, Err(RankingError::Sqlite(_))));
    assert!(client.fetch_top_or_empty(5).await.is_empty());
}

#[tokio::test]
async fn missing_table_degrades_to_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("ranks.db");
    seed(&db, "other_table", &[]);

    assert!(sqlite_client(&db, "").fetch_top_or_empty(5).await.is_empty());
}

#[tokio::test]
async fn no_backend_is_unavailable() {
    let client = RankingClient::new(RankingBackend::None);
    assert!(!client.is_available());
    assert!(matches!(client.fetch_top(5).await, Err(RankingError::Unavailable(_))));
    assert!(client.fetch_top_or_empty(5).await.is_empty());
}

#[tokio::test]
async fn unreachable_mysql_degrades_to_empty() {
    let client = RankingClient::from_config(&DatabaseConfig {
        host: "127.0.0.1".into(),
        port: 1,
        ..DatabaseConfig::default()
    });
    assert!(client.is_available());
    assert!(client.fetch_top_or_empty(5).await.is_empty());
}

#[tokio::test]
async fn concurrent_fetches_are_independent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("ranks.db");
    seed(&db, "k4ranks", &[("1", "a", 3), ("2", "b", 2), ("3", "c", 1)]);
    let client = sqlite_client(&db, "");

    let (first, second) = tokio::join!(client.fetch_top(3), client.fetch_top(3));
    assert_eq!(first.expect("first"), second.expect("second"));
}
