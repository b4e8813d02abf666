//! Remote service error types.

use thiserror::Error;

/// Result type for remote event service calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors returned by an [`EventService`](crate::EventService).
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("event not found: {0}")]
    NotFound(String),

    #[error("remote event service unreachable: {0}")]
    Unreachable(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RemoteError {
    /// Returns true if retrying the same request cannot succeed.
    ///
    /// Terminal: the target is gone or the server refused the payload.
    /// Everything else (outages, timeouts, 5xx) may clear up on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RemoteError::NotFound(_) | RemoteError::Rejected(_) | RemoteError::Config(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}
