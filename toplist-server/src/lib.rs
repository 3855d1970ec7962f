//! # toplist-server — Game-Server Integration for Toplist Displays
//!
//! Connects the game-agnostic `toplist-core` lifecycle manager and the
//! `toplist-ranking` score client to a game-server host.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Game server                   │
//! │   events ─┐    commands ─┐      tick ─┐       │
//! │           ▼              ▼            ▼       │
//! │  ┌────────────────────────────────────────┐   │
//! │  │            ToplistPlugin               │   │
//! │  │  ┌──────────────┐   ┌───────────────┐  │   │
//! │  │  │ToplistManager│◀──│  WorldQueue   │◀─┼── tokio: RankingClient
//! │  │  └──────┬───────┘   └───────────────┘  │   │
//! │  │         ▼                              │   │
//! │  │     Renderer (host world text API)     │   │
//! │  └────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `events` — Host events that drive load, refresh and unload
//! - `commands` — Operator commands, privilege check, reply formatting
//! - `queue` — Async fetches marshalled back to the game tick
//! - `schedule` — Time-based refresh timer
//! - `plugin` — The façade the host calls into
//! - `telemetry` — Logging setup

#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod events;
pub mod plugin;
pub mod queue;
pub mod schedule;
pub mod telemetry;

pub use commands::OperatorCommand;
pub use events::GameEvent;
pub use plugin::{Outbound, ToplistPlugin};
pub use queue::{WorldQueue, WorldTask};
