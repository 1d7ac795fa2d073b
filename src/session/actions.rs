//! Session Actions
//!
//! The named operations front ends call. Each issues one backend request
//! with the session's current access token, then applies the response to
//! the [`SessionStore`]. Starting or ending work also refreshes the weekly
//! aggregate.
//!
//! Only two failures are interpreted here: a 401 from the refresh endpoint
//! (the session is over) and a 404 for today's record (nothing tracked
//! yet). Everything else is returned with the state left as it was.

use super::calendar::{date_key, week_key, Clock, LocalClock};
use super::error::SessionResult;
use super::navigation::{Navigation, Route};
use super::store::SessionStore;
use super::types::{DailyWork, TokenPair, UserProfile, WeeklyWork, WorkRecord};
use crate::api::{ApiClient, ApiError, Credentials, RefreshRequest, Registration};
use reqwest::StatusCode;

/// A user session bound to a backend
pub struct WorkSession {
    api: ApiClient,
    store: SessionStore,
    clock: Box<dyn Clock>,
}

impl WorkSession {
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        Self {
            api,
            store,
            clock: Box::new(LocalClock),
        }
    }

    /// Use `clock` for date-keyed requests instead of the local date
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Exchange credentials for a token pair and mark the session authenticated
    pub async fn login(&self, credentials: &Credentials) -> SessionResult<Navigation> {
        let token = self.store.access_token().await;
        let tokens = self
            .api
            .obtain_token(credentials, token.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(username = %credentials.username, error = %e, "Login failed");
                e
            })?;

        self.store
            .update(|state| {
                state.token = tokens;
                state.is_authenticated = true;
            })
            .await?;

        tracing::info!(username = %credentials.username, "Logged in");
        Ok(Navigation::Push(Route::Home))
    }

    /// Create an account; the user is sent to the login screen afterwards
    pub async fn register(&self, details: &Registration) -> SessionResult<Navigation> {
        let token = self.store.access_token().await;
        self.api
            .register(details, token.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(username = %details.username, error = %e, "Registration failed");
                e
            })?;

        tracing::info!(username = %details.username, "Registered account");
        Ok(Navigation::Push(Route::Login))
    }

    /// Drop the tokens and the authenticated flag. No backend call.
    pub async fn logout(&self) -> SessionResult<()> {
        self.store
            .update(|state| {
                state.is_authenticated = false;
                state.token = TokenPair::default();
            })
            .await?;

        tracing::info!("Logged out");
        Ok(())
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// On 401 the session is marked unauthenticated and, unless
    /// `current_path` is already under `/login`, a redirect there is
    /// returned. Other error statuses are ignored.
    pub async fn refresh_token(
        &self,
        payload: &RefreshRequest,
        current_path: &str,
    ) -> SessionResult<Option<Navigation>> {
        let token = self.store.access_token().await;

        match self.api.refresh_access_token(payload, token.as_deref()).await {
            Ok(access) => {
                self.store
                    .update(|state| {
                        state.token.access = access.access;
                        state.is_authenticated = true;
                    })
                    .await?;
                tracing::info!("Access token refreshed");
                Ok(None)
            }
            Err(e) if e.has_status(StatusCode::UNAUTHORIZED) => {
                tracing::warn!("Refresh token rejected, session expired");
                self.store.set_authenticated(false).await?;

                if Route::Login.is_active(current_path) {
                    Ok(None)
                } else {
                    Ok(Some(Navigation::Replace(Route::Login)))
                }
            }
            Err(ApiError::Status { status, .. }) => {
                tracing::warn!(status, "Ignoring failed token refresh");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// [`refresh_token`](Self::refresh_token) with the stored refresh token
    pub async fn refresh_stored_token(
        &self,
        current_path: &str,
    ) -> SessionResult<Option<Navigation>> {
        let refresh = self.store.snapshot().await.token.refresh;
        self.refresh_token(&RefreshRequest::new(refresh), current_path)
            .await
    }

    /// Fetch and store the current user's profile
    pub async fn get_user(&self) -> SessionResult<UserProfile> {
        let token = self.store.access_token().await;
        let user = self.api.current_user(token.as_deref()).await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to fetch user profile");
            e
        })?;

        self.store.set_user(user.clone()).await?;
        Ok(user)
    }

    /// Store a token pair. Later requests carry `Bearer <access>`.
    pub async fn set_tokens(&self, tokens: TokenPair) -> SessionResult<()> {
        self.store.set_tokens(tokens).await?;
        Ok(())
    }

    /// Fetch today's record. A 404 means nothing is tracked yet and
    /// stores the zero record.
    pub async fn get_daily_work(&self) -> SessionResult<DailyWork> {
        let token = self.store.access_token().await;
        let today = date_key(self.clock.today());

        let record = match self.api.daily_work(&today, token.as_deref()).await {
            Ok(record) => record,
            Err(e) if e.has_status(StatusCode::NOT_FOUND) => {
                tracing::debug!(date = %today, "No daily work recorded yet");
                WorkRecord::zero()
            }
            Err(e) => {
                tracing::warn!(date = %today, error = %e, "Failed to fetch daily work");
                return Err(e.into());
            }
        };

        self.store.set_daily_work(record.clone()).await?;
        Ok(record)
    }

    /// Fetch the current week's aggregate, or the zero record if the
    /// backend has none
    pub async fn get_weekly_work(&self) -> SessionResult<WeeklyWork> {
        let token = self.store.access_token().await;
        let week = week_key(self.clock.today());

        let records = self
            .api
            .weekly_works(week, token.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(year = week.year, week = week.week, error = %e, "Failed to fetch weekly work");
                e
            })?;

        let record = records.into_iter().next().unwrap_or_else(WorkRecord::zero);
        self.store.set_weekly_work(record.clone()).await?;
        Ok(record)
    }

    /// Start today's record
    pub async fn start_work(&self) -> SessionResult<DailyWork> {
        let token = self.store.access_token().await;
        let record = self
            .api
            .start_daily_work(token.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to start work");
                e
            })?;

        self.store.set_daily_work(record.clone()).await?;
        tracing::info!(work_time = %record.work_time(), "Work started");

        self.follow_up_weekly_work().await;
        Ok(record)
    }

    /// Close today's record
    pub async fn end_work(&self) -> SessionResult<DailyWork> {
        let token = self.store.access_token().await;
        let today = date_key(self.clock.today());
        let record = self
            .api
            .end_daily_work(&today, token.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(date = %today, error = %e, "Failed to end work");
                e
            })?;

        self.store.set_daily_work(record.clone()).await?;
        tracing::info!(work_time = %record.work_time(), "Work ended");

        self.follow_up_weekly_work().await;
        Ok(record)
    }

    async fn follow_up_weekly_work(&self) {
        if let Err(e) = self.get_weekly_work().await {
            tracing::warn!(error = %e, "Weekly work not refreshed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::calendar::FixedClock;
    use crate::session::{SessionError, SessionState};
    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn session_for(server: &MockServer) -> WorkSession {
        let api = ApiClient::new(server.base_url(), Duration::from_secs(5)).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        WorkSession::new(api, SessionStore::in_memory()).with_clock(FixedClock(today))
    }

    async fn logged_in_session(server: &MockServer) -> WorkSession {
        let session = session_for(server);
        session
            .store()
            .update(|state| {
                state.token = TokenPair::new("acc", "ref");
                state.is_authenticated = true;
            })
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_login_stores_tokens_and_navigates_home() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/token/");
                then.status(200)
                    .json_body(json!({ "access": "acc", "refresh": "ref" }));
            })
            .await;
        let user_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/account/user/")
                    .header("Authorization", "Bearer acc");
                then.status(200).json_body(json!({ "username": "mina" }));
            })
            .await;

        let session = session_for(&server);
        let nav = session
            .login(&Credentials::new("mina", "secret"))
            .await
            .unwrap();

        assert_eq!(nav, Navigation::Push(Route::Home));
        let state = session.store().snapshot().await;
        assert!(state.is_authenticated);
        assert_eq!(state.token, TokenPair::new("acc", "ref"));

        // The new token is used from the next request on
        session.get_user().await.unwrap();
        user_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_unchanged() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/token/");
                then.status(401)
                    .json_body(json!({ "detail": "No active account" }));
            })
            .await;

        let session = session_for(&server);
        let err = session
            .login(&Credentials::new("mina", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(session.store().snapshot().await, SessionState::default());
    }

    #[tokio::test]
    async fn test_register_navigates_to_login() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/account/register/");
                then.status(201).json_body(json!({ "username": "mina" }));
            })
            .await;

        let session = session_for(&server);
        let nav = session
            .register(&Registration::new("mina", "secret"))
            .await
            .unwrap();

        assert_eq!(nav, Navigation::Push(Route::Login));
        assert!(!session.store().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_clears_tokens_only() {
        let server = MockServer::start_async().await;
        let session = logged_in_session(&server).await;
        session
            .store()
            .set_daily_work(WorkRecord::with_work_time("3h"))
            .await
            .unwrap();

        session.logout().await.unwrap();

        let state = session.store().snapshot().await;
        assert!(!state.is_authenticated);
        assert_eq!(state.token.access, "");
        assert_eq!(state.token.refresh, "");
        assert_eq!(state.daily_work.work_time(), "3h");

        // Idempotent from any prior state
        session.logout().await.unwrap();
        assert!(session.store().snapshot().await.token.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_replaces_access_token_only() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/token/refresh/")
                    .json_body(json!({ "refresh": "ref" }));
                then.status(200).json_body(json!({ "access": "fresh" }));
            })
            .await;

        let session = logged_in_session(&server).await;
        session.store().set_authenticated(false).await.unwrap();

        let nav = session.refresh_stored_token("/").await.unwrap();

        mock.assert_async().await;
        assert_eq!(nav, None);
        let state = session.store().snapshot().await;
        assert!(state.is_authenticated);
        assert_eq!(state.token, TokenPair::new("fresh", "ref"));
    }

    #[tokio::test]
    async fn test_refresh_401_redirects_to_login() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/token/refresh/");
                then.status(401)
                    .json_body(json!({ "detail": "Token is invalid or expired" }));
            })
            .await;

        let session = logged_in_session(&server).await;
        let nav = session
            .refresh_token(&RefreshRequest::new("ref"), "/work")
            .await
            .unwrap();

        assert_eq!(nav, Some(Navigation::Replace(Route::Login)));
        assert!(!session.store().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_refresh_401_on_login_page_does_not_redirect() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/token/refresh/");
                then.status(401);
            })
            .await;

        let session = logged_in_session(&server).await;

        for path in ["/login", "/login/expired"] {
            let nav = session
                .refresh_token(&RefreshRequest::new("ref"), path)
                .await
                .unwrap();
            assert_eq!(nav, None);
        }
        assert!(!session.store().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_refresh_other_status_is_ignored() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/token/refresh/");
                then.status(500);
            })
            .await;

        let session = logged_in_session(&server).await;
        let before = session.store().snapshot().await;

        let nav = session
            .refresh_token(&RefreshRequest::new("ref"), "/")
            .await
            .unwrap();

        assert_eq!(nav, None);
        assert_eq!(session.store().snapshot().await, before);
    }

    #[tokio::test]
    async fn test_get_user_overwrites_profile() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/account/user/");
                then.status(200)
                    .json_body(json!({ "username": "mina", "email": "mina@example.com" }));
            })
            .await;

        let session = logged_in_session(&server).await;
        session.get_user().await.unwrap();

        let state = session.store().snapshot().await;
        assert_eq!(state.user.get_str("email"), Some("mina@example.com"));
    }

    #[tokio::test]
    async fn test_set_tokens_sets_bearer_header() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/account/user/")
                    .header("Authorization", "Bearer X");
                then.status(200).json_body(json!({}));
            })
            .await;

        let session = session_for(&server);
        session.set_tokens(TokenPair::new("X", "Y")).await.unwrap();

        let state = session.store().snapshot().await;
        assert_eq!(state.token, TokenPair::new("X", "Y"));
        // Storing tokens alone does not authenticate the session
        assert!(!state.is_authenticated);

        session.get_user().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_daily_work_200_stores_body() {
        let server = MockServer::start_async().await;
        let body = json!({ "workTime": "2:15:00", "date": "2026-10-19", "startedAt": "09:00" });
        let response = body.clone();
        server
            .mock_async(move |when, then| {
                when.method(GET)
                    .path("/api/work-time/daily-works/2026-10-19/");
                then.status(200).json_body(response);
            })
            .await;

        let session = logged_in_session(&server).await;
        session.get_daily_work().await.unwrap();

        let state = session.store().snapshot().await;
        assert_eq!(serde_json::to_value(&state.daily_work).unwrap(), body);
    }

    #[tokio::test]
    async fn test_daily_work_404_stores_zero_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/work-time/daily-works/2026-10-19/");
                then.status(404).json_body(json!({ "detail": "Not found." }));
            })
            .await;

        let session = logged_in_session(&server).await;
        session
            .store()
            .set_daily_work(WorkRecord::with_work_time("5h"))
            .await
            .unwrap();

        let record = session.get_daily_work().await.unwrap();

        assert_eq!(record, WorkRecord::zero());
        let state = session.store().snapshot().await;
        assert_eq!(
            serde_json::to_value(&state.daily_work).unwrap(),
            json!({ "workTime": "0" })
        );
    }

    #[tokio::test]
    async fn test_daily_work_other_error_keeps_state() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/work-time/daily-works/2026-10-19/");
                then.status(500);
            })
            .await;

        let session = logged_in_session(&server).await;
        session
            .store()
            .set_daily_work(WorkRecord::with_work_time("5h"))
            .await
            .unwrap();

        assert!(session.get_daily_work().await.is_err());
        assert_eq!(
            session.store().snapshot().await.daily_work.work_time(),
            "5h"
        );
    }

    #[tokio::test]
    async fn test_weekly_work_takes_first_result() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/work-time/weekly-works/")
                    .query_param("year", "2026")
                    .query_param("week", "43");
                then.status(200).json_body(json!([
                    { "workTime": "12:00:00", "week": 43 },
                    { "workTime": "99:00:00", "week": 43 },
                ]));
            })
            .await;

        let session = logged_in_session(&server).await;
        session.get_weekly_work().await.unwrap();

        let state = session.store().snapshot().await;
        assert_eq!(
            serde_json::to_value(&state.weekly_work).unwrap(),
            json!({ "workTime": "12:00:00", "week": 43 })
        );
    }

    #[tokio::test]
    async fn test_weekly_work_empty_list_stores_zero_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/work-time/weekly-works/");
                then.status(200).json_body(json!([]));
            })
            .await;

        let session = logged_in_session(&server).await;
        session
            .store()
            .set_weekly_work(WorkRecord::with_work_time("40h"))
            .await
            .unwrap();

        session.get_weekly_work().await.unwrap();

        assert_eq!(
            session.store().snapshot().await.weekly_work,
            WorkRecord::zero()
        );
    }

    #[tokio::test]
    async fn test_start_work_stores_result_and_refreshes_week() {
        let server = MockServer::start_async().await;
        let start_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/work-time/daily-works/")
                    .header("Authorization", "Bearer acc");
                then.status(201).json_body(json!({ "workTime": "1h" }));
            })
            .await;
        let weekly_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/work-time/weekly-works/");
                then.status(200).json_body(json!([{ "workTime": "9h" }]));
            })
            .await;

        let session = logged_in_session(&server).await;
        let record = session.start_work().await.unwrap();

        start_mock.assert_async().await;
        weekly_mock.assert_async().await;
        assert_eq!(record, WorkRecord::with_work_time("1h"));

        let state = session.store().snapshot().await;
        assert_eq!(state.daily_work, WorkRecord::with_work_time("1h"));
        assert_eq!(state.weekly_work.work_time(), "9h");
    }

    #[tokio::test]
    async fn test_end_work_puts_todays_record() {
        let server = MockServer::start_async().await;
        let end_mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/work-time/daily-works/2026-10-19/");
                then.status(200).json_body(json!({ "workTime": "8:00:00" }));
            })
            .await;
        let weekly_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/work-time/weekly-works/");
                then.status(200).json_body(json!([]));
            })
            .await;

        let session = logged_in_session(&server).await;
        session.end_work().await.unwrap();

        end_mock.assert_async().await;
        weekly_mock.assert_async().await;
        let state = session.store().snapshot().await;
        assert_eq!(state.daily_work.work_time(), "8:00:00");
        assert_eq!(state.weekly_work, WorkRecord::zero());
    }

    #[tokio::test]
    async fn test_start_work_survives_weekly_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/work-time/daily-works/");
                then.status(201).json_body(json!({ "workTime": "0:01:00" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/work-time/weekly-works/");
                then.status(502);
            })
            .await;

        let session = logged_in_session(&server).await;
        let record = session.start_work().await.unwrap();

        assert_eq!(record.work_time(), "0:01:00");
        assert_eq!(
            session.store().snapshot().await.daily_work.work_time(),
            "0:01:00"
        );
    }

    #[tokio::test]
    async fn test_failed_start_skips_weekly_fetch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/work-time/daily-works/");
                then.status(400)
                    .json_body(json!({ "detail": "Already started" }));
            })
            .await;
        let weekly_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/work-time/weekly-works/");
                then.status(200).json_body(json!([]));
            })
            .await;

        let session = logged_in_session(&server).await;
        assert!(session.start_work().await.is_err());

        weekly_mock.assert_calls_async(0).await;
        assert_eq!(
            session.store().snapshot().await.daily_work,
            WorkRecord::zero()
        );
    }

    #[tokio::test]
    async fn test_refresh_transport_error_is_returned() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let api = ApiClient::new(format!("http://127.0.0.1:{}", port), Duration::from_secs(2))
            .unwrap();
        let session = WorkSession::new(api, SessionStore::in_memory());
        session
            .store()
            .update(|state| {
                state.token = TokenPair::new("acc", "ref");
                state.is_authenticated = true;
            })
            .await
            .unwrap();
        let before = session.store().snapshot().await;

        let err = session.refresh_stored_token("/").await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Api(ApiError::Unavailable | ApiError::Timeout | ApiError::Request(_))
        ));
        assert_eq!(session.store().snapshot().await, before);
    }

    #[tokio::test]
    async fn test_failed_register_returns_error_without_navigation() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/account/register/");
                then.status(400)
                    .json_body(json!({ "username": ["already exists"] }));
            })
            .await;

        let session = session_for(&server);
        let err = session
            .register(&Registration::new("mina", "secret"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(session.store().snapshot().await, SessionState::default());
    }

    #[tokio::test]
    async fn test_failed_get_user_keeps_profile() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/account/user/");
                then.status(500);
            })
            .await;

        let session = logged_in_session(&server).await;
        let mut profile = serde_json::Map::new();
        profile.insert("username".to_string(), json!("mina"));
        session
            .store()
            .set_user(UserProfile(profile))
            .await
            .unwrap();

        let err = session.get_user().await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        let state = session.store().snapshot().await;
        assert_eq!(state.user.get_str("username"), Some("mina"));
    }

    #[tokio::test]
    async fn test_failed_end_skips_weekly_fetch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/work-time/daily-works/2026-10-19/");
                then.status(400)
                    .json_body(json!({ "detail": "Not started" }));
            })
            .await;
        let weekly_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/work-time/weekly-works/");
                then.status(200).json_body(json!([]));
            })
            .await;

        let session = logged_in_session(&server).await;
        session
            .store()
            .set_daily_work(WorkRecord::with_work_time("3:00:00"))
            .await
            .unwrap();

        let err = session.end_work().await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        weekly_mock.assert_calls_async(0).await;
        assert_eq!(
            session.store().snapshot().await.daily_work,
            WorkRecord::with_work_time("3:00:00")
        );
    }
}
