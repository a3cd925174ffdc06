//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use quill_infra::database::DatabaseConfig;

const DEV_SESSION_SECRET: &str = "change-me-in-production";

/// Largest form submission accepted, in bytes. Post bodies are full articles.
pub const DEFAULT_MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Key signing the session token held in the cookie.
    pub secret: String,
    pub ttl_hours: i64,
    /// Mark the cookie `Secure` (HTTPS only).
    pub cookie_secure: bool,
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours.max(0) as u64 * 3600)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SESSION_SECRET.to_string(),
            ttl_hours: 24,
            cookie_secure: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    /// Apply the post authoring rule to `/delete/{id}` as well.
    pub delete_requires_privilege: bool,
    pub max_form_bytes: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(defaults.max_connections),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(defaults.min_connections),
            log_statements: flag("DB_LOG_STATEMENTS").unwrap_or(defaults.log_statements),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            session: Self::session_from_env(),
            delete_requires_privilege: flag("DELETE_REQUIRES_PRIVILEGE").unwrap_or(false),
            max_form_bytes: parse_var("MAX_FORM_BYTES").unwrap_or(DEFAULT_MAX_FORM_BYTES),
        }
    }

    fn session_from_env() -> SessionConfig {
        let secret = env::var("SESSION_SECRET").unwrap_or_else(|_| DEV_SESSION_SECRET.to_string());

        // Warn if using default secret in production
        if secret == DEV_SESSION_SECRET {
            let is_production = env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default session secret in production! Set SESSION_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default session secret. Set SESSION_SECRET for production use.");
            }
        }

        SessionConfig {
            secret,
            ttl_hours: parse_var("SESSION_TTL_HOURS").unwrap_or(24),
            cookie_secure: flag("SESSION_COOKIE_SECURE").unwrap_or(false),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Boolean switch: "1"/"true"/"yes" enable, "0"/"false"/"no" disable.
fn flag(key: &str) -> Option<bool> {
    let value = env::var(key).ok()?;
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
