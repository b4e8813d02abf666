//! Storage error types.

use thiserror::Error;

/// Result type for local storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised inside the local store.
///
/// These never cross the `LocalStore` public API; they are logged and turned
/// into the operation's "unavailable" result.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid stored record: {0}")]
    Model(#[from] unievents_model::ModelError),

    #[error("offline storage is unavailable")]
    Unavailable,

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
