//! # Toplist Core Library
//!
//! Game-agnostic management of persistent leaderboard ("toplist") displays
//! placed as text objects inside a running game world.
//!
//! - **Placements** — where operators put displays, stored per world
//! - **Formatting** — ranked rows to styled text lines
//! - **Registry** — live renderer handles for the loaded world
//! - **Lifecycle** — load, refresh, place, remove, unload
//!
//! The in-world renderer and the score store are external collaborators;
//! see [`renderer::Renderer`] and the `toplist-ranking` crate.

#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod format;
pub mod geometry;
pub mod lifecycle;
pub mod persistence;
pub mod placement;
pub mod registry;
pub mod renderer;
pub mod types;

pub use config::ToplistConfig;
pub use error::ToplistError;
pub use lifecycle::{CommandReply, SessionState, ToplistManager};
pub use types::*;
