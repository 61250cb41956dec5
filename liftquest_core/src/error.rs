//! Error types for the liftquest_core library.

use crate::types::AttemptStatus;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftquest_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input failed validation (out-of-range weight, reps, level, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced subject, body part, attempt or record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Concurrent mutation lost the race (e.g. second certification start).
    /// Callers should re-read state and retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Attempt status change not present in the transition table
    #[error("Invalid certification transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: AttemptStatus,
        to: AttemptStatus,
    },

    /// State management error
    #[error("State error: {0}")]
    State(String),
}
