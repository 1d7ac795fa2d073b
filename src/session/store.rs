//! Session Store
//!
//! In-memory [`SessionState`] behind an async lock. Every mutation writes
//! the whole snapshot to a [`StateStorage`] backend under one namespace
//! key; opening a store reads that key back.
//!
//! Thread-safe via Tokio's async RwLock for concurrent access.

use super::types::{SessionState, TokenPair, UserProfile, WorkRecord};
use crate::persistence::{MemoryStorage, StateStorage, StorageResult};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage key the snapshot is kept under unless configured otherwise
pub const DEFAULT_NAMESPACE: &str = "a1m0nd.kr";

/// Holds the session snapshot and keeps its persisted copy current
pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Arc<dyn StateStorage>,
    namespace: String,
}

impl SessionStore {
    /// Open a store over `storage`, rehydrating the snapshot under `namespace`.
    ///
    /// A missing, unreadable or corrupt snapshot yields the initial state.
    pub fn open(storage: Arc<dyn StateStorage>, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let state = load_snapshot(storage.as_ref(), &namespace);

        Self {
            state: RwLock::new(state),
            storage,
            namespace,
        }
    }

    /// A store that persists nowhere beyond this process
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()), DEFAULT_NAMESPACE)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Clone of the current state
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    /// Current access token, `None` while logged out
    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.bearer_token().map(str::to_string)
    }

    /// Apply `f` to the state and persist the result.
    ///
    /// The in-memory change stands even if persisting fails.
    pub async fn update<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut SessionState),
    {
        let mut state = self.state.write().await;
        f(&mut state);
        self.persist(&state)
    }

    pub async fn set_user(&self, user: UserProfile) -> StorageResult<()> {
        self.update(|state| state.user = user).await
    }

    pub async fn set_authenticated(&self, authenticated: bool) -> StorageResult<()> {
        self.update(|state| state.is_authenticated = authenticated)
            .await
    }

    pub async fn set_tokens(&self, tokens: TokenPair) -> StorageResult<()> {
        self.update(|state| state.token = tokens).await
    }

    /// Replace the access token, keeping the refresh token
    pub async fn set_access_token(&self, access: String) -> StorageResult<()> {
        self.update(|state| state.token.access = access).await
    }

    pub async fn set_daily_work(&self, record: WorkRecord) -> StorageResult<()> {
        self.update(|state| state.daily_work = record).await
    }

    pub async fn set_weekly_work(&self, record: WorkRecord) -> StorageResult<()> {
        self.update(|state| state.weekly_work = record).await
    }

    /// Return to the initial state and drop the persisted snapshot
    pub async fn reset(&self) -> StorageResult<()> {
        let mut state = self.state.write().await;
        *state = SessionState::default();
        self.storage.remove(&self.namespace)
    }

    fn persist(&self, state: &SessionState) -> StorageResult<()> {
        let content = serde_json::to_string(state)?;
        self.storage.set(&self.namespace, &content).map_err(|e| {
            tracing::warn!(namespace = %self.namespace, error = %e, "Failed to persist session state");
            e
        })
    }
}

fn load_snapshot(storage: &dyn StateStorage, namespace: &str) -> SessionState {
    let content = match storage.get(namespace) {
        Ok(Some(content)) => content,
        Ok(None) => return SessionState::default(),
        Err(e) => {
            tracing::warn!(namespace, error = %e, "Failed to read persisted session state");
            return SessionState::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(state) => {
            tracing::debug!(namespace, "Rehydrated session state");
            state
        }
        Err(e) => {
            tracing::warn!(namespace, error = %e, "Ignoring corrupt session state");
            SessionState::default()
        }
    }
}
