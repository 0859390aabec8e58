//! Error types for raid-store

use thiserror::Error;

/// Persistence error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error in {file}: {source}")]
    Ron {
        file: String,
        source: ron::error::SpannedError,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid record '{key}': {reason}")]
    InvalidRecord { key: String, reason: String },

    #[error(transparent)]
    Core(#[from] raid_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
