//! Error types for Bloom Core

use thiserror::Error;

/// Reasons a daily log (or one of its parts) is rejected before it reaches the store.
///
/// A rejected write leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Energy must be between 1 and 5, got {0}")]
    EnergyOutOfRange(u8),

    #[error("{field} must be between 0 and 100, got {value}")]
    PercentOutOfRange { field: &'static str, value: u8 },

    #[error("Unknown mood: {0}")]
    UnknownMood(String),

    #[error("Unknown symptom: {0}")]
    UnknownSymptom(String),

    #[error("Unknown keyword: {0}")]
    UnknownKeyword(String),

    #[error("At most {max} keywords are allowed, got {actual}")]
    TooManyKeywords { max: usize, actual: usize },

    #[error("Invalid month key: {0}")]
    InvalidMonth(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Errors that can occur while loading, storing or encoding wellness data
#[derive(Debug, Error)]
pub enum BloomError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
