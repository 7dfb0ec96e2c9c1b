//! Error types for RefugeeAssist.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application, including configuration, I/O, storage, LLM, and
//! pipeline errors.

use thiserror::Error;

/// Unified error type for RefugeeAssist.
///
/// All fallible functions in the application return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage (SQLite) errors
    #[error("Store error: {0}")]
    Store(String),

    /// Record lookup failures
    #[error("Not found: {0}")]
    NotFound(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// AI pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
