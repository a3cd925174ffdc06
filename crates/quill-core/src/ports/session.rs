//! Session store port - server-side records behind the session cookie.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// A signed-in browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Session store trait - abstraction over session backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a new session for a user, valid for `ttl`.
    async fn create(&self, user_id: i32, ttl: Duration) -> Result<Session, SessionError>;

    /// Look up a live session. Expired sessions are reported as absent.
    async fn get(&self, id: Uuid) -> Result<Option<Session>, SessionError>;

    /// End a session. Unknown ids are ignored.
    async fn destroy(&self, id: Uuid) -> Result<(), SessionError>;
}

/// Session store errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid session lifetime: {0}")]
    InvalidTtl(String),
}
