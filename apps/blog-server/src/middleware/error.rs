//! Error handling - maps failures to HTML error pages.

use actix_web::error::HttpError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header::ContentType};
use askama::Template;

use quill_core::error::{DomainError, RepoError};
use quill_core::ports::{AuthError, SessionError};

use crate::views::{ErrorPage, Nav};

/// Application-level error type.
///
/// Inline form problems (validation, duplicates, bad credentials) are not
/// errors; handlers re-render the form for those.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Viewer lacks the role for an author-only route.
    #[error("Not Authorised")]
    NotAuthorised,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Author-only routes answer like a missing page.
            AppError::NotAuthorised => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let page = match self {
            AppError::NotAuthorised => {
                return HttpResponse::build(status)
                    .content_type(ContentType::plaintext())
                    .body("Not Authorised");
            }
            AppError::NotFound(detail) => ErrorPage {
                nav: Nav::neutral(),
                status: status.as_u16(),
                title: "Not Found".to_string(),
                detail: Some(detail.clone()),
            },
            AppError::Internal(detail) => {
                // Log internal errors
                tracing::error!("Internal error: {}", detail);
                ErrorPage {
                    nav: Nav::neutral(),
                    status: status.as_u16(),
                    title: "Internal Server Error".to_string(),
                    detail: None,
                }
            }
        };

        match page.render() {
            Ok(html) => HttpResponse::build(status)
                .content_type(ContentType::html())
                .body(html),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                HttpResponse::build(status)
                    .content_type(ContentType::plaintext())
                    .body(page.title)
            }
        }
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Unauthorized => AppError::NotAuthorised,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => {
                tracing::error!("Unhandled constraint violation: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("template rendering failed: {err}"))
    }
}

impl From<HttpError> for AppError {
    fn from(err: HttpError) -> Self {
        AppError::Internal(format!("failed to build response: {err}"))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
