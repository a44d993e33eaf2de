//! Error types for index construction and configuration.

use thiserror::Error;

/// Errors surfaced by the indexes and their configuration.
///
/// Query paths never fail: an empty index or an over-full tree search is
/// answered, not reported. Errors only come from rejected input.
#[derive(Debug, Error)]
pub enum GeoIndexError {
    /// A coordinate or argument the index cannot work with.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A `(rank, uid)` pair that is already stored in a quad tree.
    #[error("Duplicate key: rank {rank:?}, uid {uid:?}")]
    DuplicateKey { rank: String, uid: String },

    /// Configuration values outside their accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[cfg(feature = "toml")]
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeoIndexError>;
