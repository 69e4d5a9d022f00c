//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid UTC offset: {0}")]
    InvalidUtcOffset(String),

    #[error("timestamp formatting error: {0}")]
    TimestampFormat(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
