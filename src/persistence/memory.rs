//! In-memory storage backend

use super::{StateStorage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Keeps values in a process-local map
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        values.remove(key);
        Ok(())
    }
}
