//! Session extractors and cookie helpers.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use quill_core::domain::User;
use quill_core::ports::{AuthError, BaseRepository, SessionStore, TokenService};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "quill_session";

/// Signed-in user extractor.
///
/// Use this in handlers that need an account; anonymous requests are sent to
/// the login page:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub session_id: Uuid,
}

/// Error type for authentication failures. Answers with a redirect to
/// `/login`.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AuthenticationError(#[from] pub AuthError);

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, "/login"))
            .finish()
    }
}

/// Resolve a session token to the signed-in user.
///
/// The token must verify, its session must still exist server-side and
/// belong to the user named in the token, and that user must still exist.
async fn resolve(state: &AppState, token: &str) -> Result<Identity, AuthError> {
    let claims = state.tokens.validate_token(token)?;

    let session = state
        .sessions
        .get(claims.session_id)
        .await
        .map_err(|e| {
            tracing::error!("Session store error: {}", e);
            AuthError::SessionRevoked
        })?
        .ok_or(AuthError::SessionRevoked)?;

    if session.user_id != claims.user_id {
        return Err(AuthError::InvalidToken(
            "session does not belong to token subject".to_string(),
        ));
    }

    let user = state
        .users
        .find_by_id(session.user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load session user: {}", e);
            AuthError::SessionRevoked
        })?
        .ok_or(AuthError::SessionRevoked)?;

    Ok(Identity {
        user,
        session_id: session.id,
    })
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

        Box::pin(async move {
            let Some(state) = state else {
                tracing::error!("AppState not found in app data");
                return Err(AuthenticationError(AuthError::MissingAuth));
            };
            let token = token.ok_or(AuthenticationError(AuthError::MissingAuth))?;

            resolve(&state, &token).await.map_err(AuthenticationError)
        })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref().map(|identity| &identity.user)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload);

        Box::pin(async move {
            match identity.await {
                Ok(identity) => Ok(OptionalIdentity(Some(identity))),
                Err(AuthenticationError(AuthError::MissingAuth)) => Ok(OptionalIdentity(None)),
                Err(e) => {
                    tracing::debug!(reason = %e, "Ignoring stale session cookie");
                    Ok(OptionalIdentity(None))
                }
            }
        })
    }
}

/// Open a server-side session for `user` and build the cookie referencing it.
pub async fn start_session(state: &AppState, user: &User) -> AppResult<Cookie<'static>> {
    let session = state
        .sessions
        .create(user.id, state.session_config.ttl())
        .await?;
    let token = state.tokens.generate_token(session.id, user.id)?;

    tracing::info!(user_id = user.id, session_id = %session.id, "User signed in");

    Ok(Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.session_config.cookie_secure)
        .max_age(CookieDuration::seconds(state.tokens.expiration_seconds()))
        .finish())
}

/// Cookie instructing the browser to forget its session token.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}
