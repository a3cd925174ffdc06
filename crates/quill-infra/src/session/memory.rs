//! In-memory session store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::ports::{Session, SessionError, SessionStore};

/// Session store using a HashMap behind an async RwLock.
///
/// Note: every session is lost on process restart, which signs all users out.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user_id: i32, ttl: Duration) -> Result<Session, SessionError> {
        let ttl = TimeDelta::from_std(ttl).map_err(|e| SessionError::InvalidTtl(e.to_string()))?;
        let now = Utc::now();

        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };

        let mut sessions = self.sessions.write().await;
        // Expired sessions are only ever removed here or on lookup.
        sessions.retain(|_, existing| !existing.is_expired());
        sessions.insert(session.id, session.clone());
        tracing::debug!(user_id, session_id = %session.id, "Session created");

        Ok(session)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.read().await;
        let Some(session) = sessions.get(&id) else {
            return Ok(None);
        };

        if session.is_expired() {
            drop(sessions);
            // Clean up expired entry with write lock
            let mut sessions = self.sessions.write().await;
            sessions.remove(&id);
            return Ok(None);
        }

        Ok(Some(session.clone()))
    }

    async fn destroy(&self, id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(&id).is_some() {
            tracing::debug!(session_id = %id, "Session destroyed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemorySessionStore::new();
        let session = store.create(7, HOUR).await.unwrap();

        let found = store.get(session.id).await.unwrap();
        assert_eq!(found, Some(session));
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = InMemorySessionStore::new();
        let session = store.create(7, HOUR).await.unwrap();

        store.destroy(session.id).await.unwrap();
        assert_eq!(store.get(session.id).await.unwrap(), None);

        // Destroying twice is harmless.
        store.destroy(session.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_absent() {
        let store = InMemorySessionStore::new();
        let session = store.create(7, Duration::ZERO).await.unwrap();

        assert_eq!(store.get(session.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_sweeps_expired_sessions() {
        let store = InMemorySessionStore::new();
        store.create(1, Duration::ZERO).await.unwrap();
        store.create(2, Duration::ZERO).await.unwrap();
        let live = store.create(3, HOUR).await.unwrap();

        assert_eq!(store.sessions.read().await.len(), 1);
        assert!(store.get(live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.get(Uuid::new_v4()).await.unwrap(), None);
    }
}
