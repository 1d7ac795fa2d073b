//! Backend REST API Client
//!
//! HTTP client for the work-time backend. Holds no credentials: every
//! call receives the bearer token to attach, so the caller's session
//! decides which token a request carries.

use super::dto::{AccessToken, Credentials, RefreshRequest, Registration};
use super::endpoints;
use super::error::{ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::session::calendar::WeekKey;
use crate::session::{TokenPair, UserProfile, WorkRecord};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend REST API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` with the given request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("almond/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Create a client from the `[api]` config section
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /api/token/
    pub async fn obtain_token(
        &self,
        credentials: &Credentials,
        token: Option<&str>,
    ) -> ApiResult<TokenPair> {
        let request = self
            .request(Method::POST, endpoints::TOKEN, token)
            .json(credentials);
        self.fetch(request).await
    }

    /// POST /api/token/refresh/
    pub async fn refresh_access_token(
        &self,
        payload: &RefreshRequest,
        token: Option<&str>,
    ) -> ApiResult<AccessToken> {
        let request = self
            .request(Method::POST, endpoints::TOKEN_REFRESH, token)
            .json(payload);
        self.fetch(request).await
    }

    /// POST /account/register/
    pub async fn register(&self, details: &Registration, token: Option<&str>) -> ApiResult<()> {
        let request = self
            .request(Method::POST, endpoints::REGISTER, token)
            .json(details);
        self.execute(request).await?;
        Ok(())
    }

    /// GET /account/user/
    pub async fn current_user(&self, token: Option<&str>) -> ApiResult<UserProfile> {
        let request = self.request(Method::GET, endpoints::USER, token);
        self.fetch(request).await
    }

    /// GET /api/work-time/daily-works/{date}/
    pub async fn daily_work(&self, date_key: &str, token: Option<&str>) -> ApiResult<WorkRecord> {
        let request = self.request(Method::GET, &endpoints::daily_work(date_key), token);
        self.fetch(request).await
    }

    /// POST /api/work-time/daily-works/
    pub async fn start_daily_work(&self, token: Option<&str>) -> ApiResult<WorkRecord> {
        let request = self.request(Method::POST, endpoints::DAILY_WORKS, token);
        self.fetch(request).await
    }

    /// PUT /api/work-time/daily-works/{date}/
    pub async fn end_daily_work(
        &self,
        date_key: &str,
        token: Option<&str>,
    ) -> ApiResult<WorkRecord> {
        let request = self.request(Method::PUT, &endpoints::daily_work(date_key), token);
        self.fetch(request).await
    }

    /// GET /api/work-time/weekly-works/?year=&week=
    pub async fn weekly_works(
        &self,
        week: WeekKey,
        token: Option<&str>,
    ) -> ApiResult<Vec<WorkRecord>> {
        let request = self
            .request(Method::GET, endpoints::WEEKLY_WORKS, token)
            .query(&[("year", week.year.to_string()), ("week", week.week.to_string())]);
        self.fetch(request).await
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, authenticated = token.is_some(), "Sending API request");

        let builder = self.client.request(method, url);
        match token {
            Some(token) if !token.is_empty() => builder.bearer_auth(token),
            _ => builder,
        }
    }

    /// Send a request, turning non-success statuses into errors
    async fn execute(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(ApiError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
