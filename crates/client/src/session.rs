//! Session credentials attached to outgoing requests.

use std::sync::{PoisonError, RwLock};

/// Source of the access token and client id for the current session.
pub trait SessionStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn client_id(&self) -> Option<String>;
}

#[derive(Default)]
struct SessionState {
    access_token: Option<String>,
    client_id: Option<String>,
}

/// Process-local session storage.
#[derive(Default)]
pub struct MemorySession {
    state: RwLock<SessionState>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(access_token: impl Into<String>, client_id: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_access_token(Some(access_token.into()));
        session.set_client_id(Some(client_id.into()));
        session
    }

    pub fn set_access_token(&self, token: Option<String>) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).access_token = token;
    }

    pub fn set_client_id(&self, client_id: Option<String>) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).client_id = client_id;
    }

    /// Forget all credentials.
    pub fn clear(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = SessionState::default();
    }
}

impl SessionStore for MemorySession {
    fn access_token(&self) -> Option<String> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).access_token.clone()
    }

    fn client_id(&self) -> Option<String> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).client_id.clone()
    }
}

impl std::fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("MemorySession")
            .field("access_token", &state.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("client_id", &state.client_id)
            .finish()
    }
}
