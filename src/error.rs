//! Error types for the Manbo voice plugin.

use thiserror::Error;

/// Main error type for plugin setup.
///
/// Failures of an individual voice request are reported through
/// [`crate::voice::VoiceError`] instead, since those end up in a chat reply.
#[derive(Error, Debug)]
pub enum ManboError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<config::ConfigError> for ManboError {
    fn from(err: config::ConfigError) -> Self {
        ManboError::Config(err.to_string())
    }
}

/// Result type alias for Manbo operations.
pub type Result<T> = std::result::Result<T, ManboError>;
