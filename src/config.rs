//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::persistence::{CookieJarStorage, MemoryStorage, StateStorage};
use crate::session::DEFAULT_NAMESPACE;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Production backend
pub const DEFAULT_API_URL: &str = "https://uf1k81q71i.execute-api.ap-northeast-2.amazonaws.com/prod";

/// Backend started locally for development
pub const LOCAL_API_URL: &str = "http://localhost:8000";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Where the session snapshot is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON cookie jar on disk
    #[default]
    Cookie,
    /// Process memory only
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cookie" => Ok(StorageBackend::Cookie),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_storage_path")]
    pub path: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_storage_path() -> String {
    CookieJarStorage::default_path()
        .to_string_lossy()
        .to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
            namespace: default_namespace(),
        }
    }
}

impl StorageConfig {
    /// Build the configured storage backend
    pub fn open(&self) -> Arc<dyn StateStorage> {
        match self.backend {
            StorageBackend::Cookie => Arc::new(CookieJarStorage::new(&self.path)),
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("almond").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // API overrides
        if let Ok(url) = std::env::var("ALMOND_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(timeout) = std::env::var("ALMOND_REQUEST_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.api.request_timeout_secs = secs;
            }
        }

        // Storage overrides
        if let Ok(backend) = std::env::var("ALMOND_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(backend) => self.storage.backend = backend,
                Err(e) => tracing::warn!("Ignoring ALMOND_STORAGE_BACKEND: {}", e),
            }
        }
        if let Ok(path) = std::env::var("ALMOND_STORAGE_PATH") {
            self.storage.path = path;
        }
        if let Ok(namespace) = std::env::var("ALMOND_NAMESPACE") {
            self.storage.namespace = namespace;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("ALMOND_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ALMOND_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# Almond Configuration
#
# Environment variables override these settings:
# - ALMOND_API_URL
# - ALMOND_REQUEST_TIMEOUT
# - ALMOND_STORAGE_BACKEND
# - ALMOND_STORAGE_PATH
# - ALMOND_NAMESPACE
# - ALMOND_LOG_LEVEL
# - ALMOND_LOG_FORMAT

[api]
# Backend base URL
base_url = "{api_url}"
# Local development backend
# base_url = "{local_url}"

# Request timeout in seconds
request_timeout_secs = 30

[storage]
# Where the session is kept: cookie (file on disk) or memory
backend = "cookie"

# Cookie jar file
# path = "~/.local/share/almond/cookies.json"

# Key the session snapshot is stored under
namespace = "{namespace}"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#,
        api_url = DEFAULT_API_URL,
        local_url = LOCAL_API_URL,
        namespace = DEFAULT_NAMESPACE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.storage.backend, StorageBackend::Cookie);
        assert_eq!(config.storage.namespace, "a1m0nd.kr");
        assert!(config.storage.path.ends_with("cookies.json"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_parse_partial_file() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "http://localhost:8000"

            [storage]
            backend = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, LOCAL_API_URL);
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_generated_config_round_trips() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.storage.backend, StorageBackend::Cookie);
        assert_eq!(config.storage.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = 1").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Cookie".parse::<StorageBackend>(), Ok(StorageBackend::Cookie));
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("ALMOND_NAMESPACE", "test.ns");
        std::env::set_var("ALMOND_STORAGE_BACKEND", "memory");
        std::env::set_var("ALMOND_REQUEST_TIMEOUT", "not-a-number");

        let config = Config::from_env();

        std::env::remove_var("ALMOND_NAMESPACE");
        std::env::remove_var("ALMOND_STORAGE_BACKEND");
        std::env::remove_var("ALMOND_REQUEST_TIMEOUT");

        assert_eq!(config.storage.namespace, "test.ns");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.api.request_timeout_secs, 30);
    }
}
