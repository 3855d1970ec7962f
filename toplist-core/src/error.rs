//! Error types for the toplist core library.

use thiserror::Error;

/// Top-level error type for all toplist core operations.
#[derive(Error, Debug)]
pub enum ToplistError {
    /// A coordinate triple could not be parsed.
    #[error("Invalid coordinate triple '{input}': {reason}")]
    InvalidTriple {
        /// The offending text.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The in-world text renderer is not available.
    #[error("Renderer unavailable")]
    RendererUnavailable,

    /// An operation needed a loaded world but none is active.
    #[error("No active world session")]
    NoActiveWorld,

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ToplistError>;
