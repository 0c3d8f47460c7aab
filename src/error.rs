//! # Error Types
//!
//! This module defines error types used throughout the cardnews library.

use thiserror::Error;

/// Main error type for cardnews operations
#[derive(Debug, Error)]
pub enum CardNewsError {
    /// Local persistence failure (slot read/write)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Data that does not match the expected shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// Rejected user input (bad file type, oversized upload, unknown field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown template identifier
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Backend responded with an error
    #[error("API error: {0}")]
    Api(String),

    /// Transport-level errors (connection, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, CardNewsError>;
