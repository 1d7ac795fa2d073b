//! File-backed cookie jar
//!
//! Every key lives in a single JSON object on disk. Each write rewrites
//! the whole file through a temporary sibling and a rename, so a crash
//! mid-write leaves the previous jar intact.

use super::{StateStorage, StorageError, StorageResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Cookie-style storage persisted to a JSON file
#[derive(Debug)]
pub struct CookieJarStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles on the jar file
    guard: Mutex<()>,
}

impl CookieJarStorage {
    /// Create a jar at `path`. The file is created lazily on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Default jar location under the user's local data directory
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|p| p.join("almond").join("cookies.json"))
            .unwrap_or_else(|| PathBuf::from("./almond_cookies.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_jar(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Jar contents to build a write on. An unparseable jar is replaced.
    fn read_jar_for_write(&self) -> StorageResult<(BTreeMap<String, String>, bool)> {
        match self.read_jar() {
            Ok(jar) => Ok((jar, false)),
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(path = ?self.path, error = %e, "Overwriting corrupt cookie jar");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_jar(&self, jar: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(jar)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StateStorage for CookieJarStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self
            .guard
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(self.read_jar()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self
            .guard
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        let (mut jar, _) = self.read_jar_for_write()?;
        jar.insert(key.to_string(), value.to_string());
        self.write_jar(&jar)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let _guard = self
            .guard
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        let (mut jar, corrupt) = self.read_jar_for_write()?;
        if jar.remove(key).is_some() || corrupt {
            self.write_jar(&jar)?;
        }
        Ok(())
    }
}
