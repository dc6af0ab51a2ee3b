//! Error types for the cardscan-core library.
//!
//! The scanning engine itself never fails: unmatched lines are dropped and
//! ingestion into a finished session is a no-op. Errors only come from the
//! surfaces around it, such as loading configuration.

use thiserror::Error;

/// Main error type for the cardscan library.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to configuration values.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A lower bound is greater than its upper bound.
    #[error("invalid range for {field}: {min} > {max}")]
    InvalidRange {
        field: &'static str,
        min: usize,
        max: usize,
    },

    /// A value lies outside its accepted bounds.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A value that must be positive is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Result type for the cardscan library.
pub type Result<T> = std::result::Result<T, ScanError>;
