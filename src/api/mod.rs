//! Backend REST API
//!
//! Typed client for the work-time backend.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/token/` - Obtain an access/refresh token pair
//! - `POST /api/token/refresh/` - Exchange a refresh token for a new access token
//!
//! ## Account
//! - `GET /account/user/` - Current user profile
//! - `POST /account/register/` - Create an account
//!
//! ## Work time
//! - `GET /api/work-time/daily-works/{date}/` - Today's record
//! - `POST /api/work-time/daily-works/` - Start today's record
//! - `PUT /api/work-time/daily-works/{date}/` - Close today's record
//! - `GET /api/work-time/weekly-works/?year=&week=` - Weekly aggregate
//!
//! # Example
//!
//! ```rust,no_run
//! use almond::api::{ApiClient, Credentials};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("http://localhost:8000", Duration::from_secs(30))?;
//!     let tokens = client
//!         .obtain_token(&Credentials::new("mina", "secret"), None)
//!         .await?;
//!     let user = client.current_user(Some(tokens.access.as_str())).await?;
//!     println!("{:?}", user);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dto;
pub mod endpoints;
pub mod error;

pub use client::ApiClient;
pub use dto::{AccessToken, Credentials, RefreshRequest, Registration};
pub use error::{ApiError, ApiResult};
