//! Session & Work State
//!
//! Client-side state for a signed-in user:
//!
//! - **types**: The persisted snapshot (tokens, profile, work records)
//! - **store**: Snapshot behind an async lock, persisted on every mutation
//! - **actions**: Backend-synchronizing operations (login, start/end work, ...)
//! - **navigation**: Route intents returned by actions
//! - **calendar**: Date and ISO week keys
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use almond::api::{ApiClient, Credentials};
//! use almond::persistence::CookieJarStorage;
//! use almond::session::{SessionStore, WorkSession, DEFAULT_NAMESPACE};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Arc::new(CookieJarStorage::new(CookieJarStorage::default_path()));
//!     let store = SessionStore::open(storage, DEFAULT_NAMESPACE);
//!     let api = ApiClient::new("http://localhost:8000", Duration::from_secs(30))?;
//!     let session = WorkSession::new(api, store);
//!
//!     session.login(&Credentials::new("mina", "secret")).await?;
//!     let today = session.start_work().await?;
//!     println!("Worked today: {}", today.work_time());
//!
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod calendar;
pub mod error;
pub mod navigation;
pub mod store;
pub mod types;

pub use actions::WorkSession;
pub use calendar::{date_key, week_key, Clock, FixedClock, LocalClock, WeekKey};
pub use error::{SessionError, SessionResult};
pub use navigation::{Navigation, Route};
pub use store::{SessionStore, DEFAULT_NAMESPACE};
pub use types::{
    DailyWork, SessionState, TokenPair, UserProfile, WeeklyWork, WorkRecord, ZERO_WORK_TIME,
};
