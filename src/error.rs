//! Error types for Focusd

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// API error
    #[error("API error: {0}")]
    Api(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Not found error
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Ownership mismatch: the record belongs to a different owner
    #[error("{0}")]
    Forbidden(String),

    /// Operation not valid for the record's current state
    #[error("{0}")]
    InvalidState(String),
}

/// Result type alias for Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
