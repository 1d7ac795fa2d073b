//! Session error types

use crate::api::ApiError;
use crate::persistence::StorageError;
use thiserror::Error;

/// Errors returned by session actions
#[derive(Error, Debug)]
pub enum SessionError {
    /// Backend call failed
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Snapshot could not be persisted
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// HTTP status of a failed backend call
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            SessionError::Api(err) => err.status(),
            SessionError::Storage(_) => None,
        }
    }
}

/// Result type alias for session actions
pub type SessionResult<T> = Result<T, SessionError>;
