//! Sync and coordinator error types.

use thiserror::Error;
use unievents_model::ModelError;
use unievents_remote::RemoteError;

/// Result type for coordinator operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced to callers of the offline coordinator.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("local storage error: {0}")]
    Storage(String),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("invalid event: {0}")]
    Validation(#[from] ModelError),

    #[error("coordinator not running")]
    ChannelClosed,

    #[error("operation requires a connection: {0}")]
    Offline(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    /// Returns true if the error came from the remote service and retrying
    /// cannot help.
    pub fn is_terminal(&self) -> bool {
        match self {
            SyncError::Remote(e) => e.is_terminal(),
            SyncError::Validation(_) | SyncError::Config(_) => true,
            _ => false,
        }
    }
}
