//! Session state types
//!
//! The snapshot held in memory and persisted as one JSON document.
//! Field names follow the camelCase keys the web client stored, so an
//! existing persisted snapshot rehydrates unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Work time reported for a record that does not exist yet
pub const ZERO_WORK_TIME: &str = "0";

/// Access/refresh credential pair issued by the token endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(default)]
    pub access: String,
    #[serde(default)]
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    /// Both tokens empty
    pub fn is_empty(&self) -> bool {
        self.access.is_empty() && self.refresh.is_empty()
    }
}

/// User profile as returned by the account endpoint.
///
/// The server owns the shape of this record; it is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(pub Map<String, Value>);

impl UserProfile {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String field lookup, `None` for missing or non-string values
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A tracked work-time record.
///
/// Only `workTime` is interpreted; every other server-defined field is
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkRecord {
    #[serde(rename = "workTime", default, skip_serializing_if = "Option::is_none")]
    pub work_time: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Today's record, fetched by date key
pub type DailyWork = WorkRecord;

/// Aggregate for the current ISO week
pub type WeeklyWork = WorkRecord;

impl WorkRecord {
    /// The placeholder stored when the server has no record yet
    pub fn zero() -> Self {
        Self::with_work_time(ZERO_WORK_TIME)
    }

    pub fn with_work_time(work_time: impl Into<String>) -> Self {
        Self {
            work_time: Some(work_time.into()),
            fields: Map::new(),
        }
    }

    /// Work time as reported, `"0"` when the server omitted it
    pub fn work_time(&self) -> &str {
        self.work_time.as_deref().unwrap_or(ZERO_WORK_TIME)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn is_zero(&self) -> bool {
        self.fields.is_empty() && self.work_time() == ZERO_WORK_TIME
    }
}

/// The whole persisted session snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub user: UserProfile,
    pub is_authenticated: bool,
    pub token: TokenPair,
    pub daily_work: DailyWork,
    pub weekly_work: WeeklyWork,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: UserProfile::default(),
            is_authenticated: false,
            token: TokenPair::default(),
            daily_work: WorkRecord::zero(),
            weekly_work: WorkRecord::zero(),
        }
    }
}

impl SessionState {
    /// Access token to attach to requests, `None` while logged out
    pub fn bearer_token(&self) -> Option<&str> {
        if self.token.access.is_empty() {
            None
        } else {
            Some(&self.token.access)
        }
    }
}
