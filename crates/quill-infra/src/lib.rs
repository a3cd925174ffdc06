//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains the database, password hashing, session token and
//! session store integrations.

pub mod auth;
pub mod database;
pub mod session;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, SqlCommentRepository, SqlPostRepository, SqlUserRepository, connect,
};
pub use session::InMemorySessionStore;
