//! Application state - shared across all handlers.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::DbConn;

use quill_core::AuthorizationPolicy;
use quill_core::ports::{
    CommentRepository, PasswordService, PostRepository, SessionStore, TokenService, UserRepository,
};
use quill_infra::{
    Argon2PasswordService, InMemorySessionStore, JwtConfig, JwtTokenService, SqlCommentRepository,
    SqlPostRepository, SqlUserRepository,
};

use crate::config::{AppConfig, SessionConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbConn>,
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub policy: AuthorizationPolicy,
    pub session_config: SessionConfig,
}

impl AppState {
    /// Connect to the database, bring the schema up to date and build the state.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db = quill_infra::connect(&config.database).await?;

        Migrator::up(&db, None).await?;
        let db = Arc::new(db);
        tracing::info!("Database schema up to date");

        let state = Self::builder(db, config.session.clone())
            .policy(AuthorizationPolicy::new(config.delete_requires_privilege))
            .build();

        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Start from an open connection with the default services.
    pub fn builder(db: Arc<DbConn>, session_config: SessionConfig) -> AppStateBuilder {
        AppStateBuilder {
            db,
            session_config,
            passwords: Arc::new(Argon2PasswordService::new()),
            policy: AuthorizationPolicy::default(),
        }
    }
}

/// Assembles an [`AppState`], letting callers swap the password service or
/// policy.
pub struct AppStateBuilder {
    db: Arc<DbConn>,
    session_config: SessionConfig,
    passwords: Arc<dyn PasswordService>,
    policy: AuthorizationPolicy,
}

impl AppStateBuilder {
    pub fn passwords(mut self, passwords: Arc<dyn PasswordService>) -> Self {
        self.passwords = passwords;
        self
    }

    pub fn policy(mut self, policy: AuthorizationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> AppState {
        let tokens = JwtTokenService::new(JwtConfig {
            secret: self.session_config.secret.clone(),
            expiration_hours: self.session_config.ttl_hours,
            ..JwtConfig::default()
        });

        AppState {
            users: Arc::new(SqlUserRepository::new(self.db.clone())),
            posts: Arc::new(SqlPostRepository::new(self.db.clone())),
            comments: Arc::new(SqlCommentRepository::new(self.db.clone())),
            db: self.db,
            sessions: Arc::new(InMemorySessionStore::new()),
            tokens: Arc::new(tokens),
            passwords: self.passwords,
            policy: self.policy,
            session_config: self.session_config,
        }
    }
}
