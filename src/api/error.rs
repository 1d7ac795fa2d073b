//! API Client Error Types
//!
//! Errors raised while talking to the backend REST API.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling the backend API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Backend could not be reached
    #[error("API unavailable")]
    Unavailable,

    /// Request did not complete in time
    #[error("Request timeout")]
    Timeout,

    /// Transport or client construction failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build from a transport error, separating timeouts and refused connections
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Unavailable
        } else {
            ApiError::Request(err)
        }
    }

    /// HTTP status of the response, if the backend answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => StatusCode::from_u16(*status).ok(),
            _ => None,
        }
    }

    /// True for a response carrying exactly `status`
    pub fn has_status(&self, status: StatusCode) -> bool {
        self.status() == Some(status)
    }
}

/// Result type alias for API calls
pub type ApiResult<T> = Result<T, ApiError>;
