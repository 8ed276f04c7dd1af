//! Session seam.
//!
//! Session storage and transport (cookies, JWTs, a Redis table) belong to
//! the surrounding application. The core only needs two things from it:
//! create a session on login and resolve one to a user id on
//! authenticated requests. [`InMemorySessionStore`] is enough for tests
//! and single-process deployments.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::crypto;
use crate::AuthError;

/// An established session. The id is an opaque random string; nothing in
/// the core parses it.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionStore {
    /// Creates a session for `user_id` valid for `ttl`.
    async fn create(&self, user_id: i64, ttl: Duration) -> Result<Session, AuthError>;

    /// Resolves a session id to the owning user, `None` when unknown or
    /// expired.
    async fn resolve(&self, session_id: &str) -> Result<Option<Session>, AuthError>;

    /// Removes a session. Removing an unknown id is not an error.
    async fn revoke(&self, session_id: &str) -> Result<(), AuthError>;
}

/// Process-local session store backed by a `HashMap`.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user_id: i64, ttl: Duration) -> Result<Session, AuthError> {
        let session = Session {
            id: crypto::generate_session_id(),
            user_id,
            expires_at: Utc::now() + ttl,
        };

        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| AuthError::DatabaseError("session store poisoned".to_owned()))?;
        sessions.insert(session.id.clone(), session.clone());
        drop(sessions);

        Ok(session)
    }

    async fn resolve(&self, session_id: &str) -> Result<Option<Session>, AuthError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| AuthError::DatabaseError("session store poisoned".to_owned()))?;
        Ok(sessions
            .get(session_id)
            .filter(|s| s.expires_at > Utc::now())
            .cloned())
    }

    async fn revoke(&self, session_id: &str) -> Result<(), AuthError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| AuthError::DatabaseError("session store poisoned".to_owned()))?;
        sessions.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_resolve() {
        let store = InMemorySessionStore::new();
        let session = store.create(42, Duration::hours(1)).await.unwrap();

        let resolved = store.resolve(&session.id).await.unwrap().unwrap();
        assert_eq!(resolved.user_id, 42);
    }

    #[tokio::test]
    async fn test_expired_session_does_not_resolve() {
        let store = InMemorySessionStore::new();
        let session = store.create(42, Duration::seconds(-1)).await.unwrap();

        assert!(store.resolve(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let store = InMemorySessionStore::new();
        let session = store.create(42, Duration::hours(1)).await.unwrap();

        store.revoke(&session.id).await.unwrap();
        store.revoke(&session.id).await.unwrap();
        assert!(store.resolve(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_ids_are_unique() {
        let store = InMemorySessionStore::new();
        let a = store.create(1, Duration::hours(1)).await.unwrap();
        let b = store.create(1, Duration::hours(1)).await.unwrap();
        assert_ne!(a.id, b.id);
    }
}
