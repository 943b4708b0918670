//! CLI error types.

use thiserror::Error;
use wakeshift_core::TracingError;
use wakeshift_providers::ProviderError;
use wakeshift_server::ServerError;

use crate::secret::SecretError;

/// Result type for CLI operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced to the user as `error: ...`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A secret reference could not be resolved.
    #[error("configuration error: {0}")]
    Secret(#[from] SecretError),

    /// Provider error.
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// Shift or webhook server error.
    #[error("{0}")]
    Server(#[from] ServerError),

    /// Logging could not be set up.
    #[error("{0}")]
    Tracing(#[from] TracingError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
