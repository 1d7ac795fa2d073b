//! # Almond
//!
//! Session and work-time state client for the Almond work tracking API.
//!
//! ## Features
//!
//! - **Session state**: Tokens, user profile, daily and weekly work records
//! - **Persistence**: Snapshot written on every change, restored on start
//! - **Backend sync**: Typed REST client, bearer token attached per request
//! - **Navigation intents**: Actions report where the UI should go instead of routing
//!
//! ## Modules
//!
//! - [`session`]: State store and actions
//! - [`api`]: Backend REST client
//! - [`persistence`]: Storage backends for the snapshot
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use almond::{ApiClient, Config, Credentials, SessionStore, WorkSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let store = SessionStore::open(config.storage.open(), &config.storage.namespace);
//!     let session = WorkSession::new(ApiClient::from_config(&config.api)?, store);
//!
//!     session.login(&Credentials::new("mina", "secret")).await?;
//!     session.get_daily_work().await?;
//!     let week = session.get_weekly_work().await?;
//!
//!     println!("This week: {}", week.work_time());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod persistence;
pub mod session;

// Re-export top-level types for convenience
pub use api::{ApiClient, ApiError, ApiResult, Credentials, RefreshRequest, Registration};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, StorageBackend, StorageConfig};

pub use persistence::{CookieJarStorage, MemoryStorage, StateStorage, StorageError};

pub use session::{
    DailyWork, Navigation, Route, SessionError, SessionResult, SessionState, SessionStore,
    TokenPair, UserProfile, WeeklyWork, WorkRecord, WorkSession,
};
