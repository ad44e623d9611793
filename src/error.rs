//! Error types for loginflow

use thiserror::Error;

/// Result type alias for loginflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in loginflow
///
/// User cancellation is deliberately not represented here: an empty
/// acquisition is a neutral outcome, not a fault.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend rejected the exchange; carries the server-supplied
    /// message when one was present, otherwise a generic per-provider one.
    #[error("{0}")]
    Backend(String),

    #[error("SDK initialization failed: {0}")]
    SdkInit(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::OAuth(err.to_string())
    }
}
