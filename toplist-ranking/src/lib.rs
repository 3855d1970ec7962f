//! # toplist-ranking — Ranking Client for Toplist Displays
//!
//! Fetches the ordered, dense-ranked top-N list shown on every display from
//! the K4 ranks table:
//!   - **MySQL** via `sqlx` (production servers)
//!   - **SQLite** via `rusqlite` (local / single-host setups)
//!
//! Fetching is the only real I/O in the display pipeline. It runs on the
//! async runtime, never on the game thread, and degrades to an empty list
//! on failure so displays fall back to "title only".

pub mod client;
pub mod error;
pub mod mysql;
pub mod query;
pub mod sqlite;

pub use client::{RankingBackend, RankingClient};
pub use error::RankingError;
