//! Error types for roomcast.

use thiserror::Error;

/// Common error type for roomcast.
#[derive(Error, Debug)]
pub enum RoomcastError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for configuration values.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for roomcast operations.
pub type Result<T> = std::result::Result<T, RoomcastError>;
