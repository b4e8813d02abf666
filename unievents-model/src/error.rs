//! Model error types.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while validating or decoding model types.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("event title must not be empty")]
    EmptyTitle,

    #[error("published event {0} must have at least one category")]
    MissingCategory(String),

    #[error("event {id} ends ({end}) before it starts ({start})")]
    EndBeforeStart {
        id: String,
        start: String,
        end: String,
    },

    #[error("unknown mutation action: {0}")]
    UnknownAction(String),

    #[error("unknown sort order: {0}")]
    UnknownSort(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
