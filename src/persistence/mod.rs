//! State Persistence
//!
//! Pluggable key/value backends for the persisted session snapshot.
//! A backend behaves like a browser cookie store: values are strings
//! looked up, written and deleted by key.
//!
//! - **memory**: process-local map, nothing survives a restart
//! - **cookie_jar**: JSON file holding every key, survives restarts

mod cookie_jar;
mod error;
mod memory;

pub use cookie_jar::CookieJarStorage;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;

/// A string key/value store used to persist the session snapshot
pub trait StateStorage: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
