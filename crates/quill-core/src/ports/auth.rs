//! Authentication ports - password hashing and session tokens.

use uuid::Uuid;

/// Claims carried by a signed session token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub session_id: Uuid,
    pub user_id: i32,
    pub exp: i64,
}

/// Signs and verifies the token a browser presents in its session cookie.
pub trait TokenService: Send + Sync {
    /// Sign a token referencing a server-side session.
    fn generate_token(&self, session_id: Uuid, user_id: i32) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens, in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing session cookie")]
    MissingAuth,

    #[error("Session not found or expired")]
    SessionRevoked,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
