//! Error types for the pagetrace SDK.

/// Errors that can occur when using the pagetrace SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP client construction failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
