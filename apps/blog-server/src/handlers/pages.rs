//! Static pages.

use actix_web::{HttpResponse, web};

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views::{AboutPage, ContactPage, Nav, render};

/// GET /about
pub async fn about(state: web::Data<AppState>, viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    render(&AboutPage {
        nav: Nav::new(viewer.user(), &state.policy),
    })
}

/// GET /contact
pub async fn contact(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    render(&ContactPage {
        nav: Nav::new(viewer.user(), &state.policy),
    })
}
