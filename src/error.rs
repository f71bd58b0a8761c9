// src/error.rs
// Standardized error types for pinchat

use thiserror::Error;

/// Main error type for the pinchat library
#[derive(Error, Debug)]
pub enum PinchatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("text extraction error: {0}")]
    Extraction(String),

    #[error("completion error: {0}")]
    Completion(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown error: {0}")]
    Other(String),
}

/// Convenience type alias for Result using PinchatError
pub type Result<T> = std::result::Result<T, PinchatError>;

impl From<String> for PinchatError {
    fn from(s: String) -> Self {
        PinchatError::Other(s)
    }
}

impl From<PinchatError> for String {
    fn from(err: PinchatError) -> Self {
        err.to_string()
    }
}
