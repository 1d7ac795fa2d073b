//! Data Transfer Objects
//!
//! Request bodies sent to, and token responses read from, the backend.
//! Profile and work-time records are defined in [`crate::session`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Username/password pair for the token endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Account registration details.
///
/// Any extra fields the signup form collects go in `extra` and are sent
/// alongside the required ones.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Registration {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            extra: Map::new(),
        }
    }

    /// Add an extra string field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), Value::String(value.into()));
        self
    }
}

/// Body of the refresh endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

impl RefreshRequest {
    pub fn new(refresh: impl Into<String>) -> Self {
        Self {
            refresh: refresh.into(),
        }
    }
}

/// Response of the refresh endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access: String,
}
