//! Account handlers - registration, login and logout.

use actix_web::{HttpResponse, web};

use quill_core::domain::NewUser;
use quill_core::error::RepoError;
use quill_core::ports::{PasswordService, SessionStore, UserRepository};
use quill_shared::{LoginForm, RegisterForm};

use super::redirect;
use crate::middleware::auth::{OptionalIdentity, removal_cookie, start_session};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views::{LoginPage, Nav, RegisterPage, render};

pub(crate) const DUPLICATE_ACCOUNT: &str =
    "You've already signed in with that account. login Instead.";
pub(crate) const UNKNOWN_EMAIL: &str = "Email does not exist.";
pub(crate) const WRONG_PASSWORD: &str = "Password Incorrect. please try again.";

/// GET /register
pub async fn register_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    render(&RegisterPage {
        nav: Nav::new(viewer.user(), &state.policy),
        form: RegisterForm::default(),
        errors: Vec::new(),
    })
}

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    form: web::Form<RegisterForm>,
) -> AppResult<HttpResponse> {
    let mut form = form.into_inner();
    form.normalize();

    let rejected = |form: RegisterForm, errors: Vec<String>| {
        render(&RegisterPage {
            nav: Nav::new(viewer.user(), &state.policy),
            form: RegisterForm {
                password: String::new(),
                ..form
            },
            errors,
        })
    };

    let errors = form.error_messages();
    if !errors.is_empty() {
        return rejected(form, errors);
    }

    if state.users.find_by_email(&form.email).await?.is_some() {
        return rejected(form, vec![DUPLICATE_ACCOUNT.to_string()]);
    }

    let password_hash = state.passwords.hash(&form.password)?;

    let new_user = NewUser {
        name: form.name.clone(),
        email: form.email.clone(),
        password_hash,
    };
    let user = match state.users.register(new_user).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration of the same email.
        Err(RepoError::Constraint(_)) => {
            return rejected(form, vec![DUPLICATE_ACCOUNT.to_string()]);
        }
        Err(e) => return Err(e.into()),
    };

    let cookie = start_session(&state, &user).await?;

    let mut response = redirect("/");
    response.add_cookie(&cookie)?;
    Ok(response)
}

/// GET /login
pub async fn login_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    render(&LoginPage {
        nav: Nav::new(viewer.user(), &state.policy),
        form: LoginForm::default(),
        errors: Vec::new(),
    })
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let mut form = form.into_inner();
    form.normalize();

    // The typed email is kept; the password never is.
    let rejected = |form: LoginForm, errors: Vec<String>| {
        render(&LoginPage {
            nav: Nav::new(viewer.user(), &state.policy),
            form: LoginForm {
                password: String::new(),
                ..form
            },
            errors,
        })
    };

    let errors = form.error_messages();
    if !errors.is_empty() {
        return rejected(form, errors);
    }

    let Some(user) = state.users.find_by_email(&form.email).await? else {
        tracing::info!("Login attempt for unknown email");
        return rejected(form, vec![UNKNOWN_EMAIL.to_string()]);
    };

    if !state.passwords.verify(&form.password, &user.password_hash)? {
        tracing::info!(user_id = user.id, "Login attempt with wrong password");
        return rejected(form, vec![WRONG_PASSWORD.to_string()]);
    }

    let cookie = start_session(&state, &user).await?;

    let mut response = redirect("/");
    response.add_cookie(&cookie)?;
    Ok(response)
}

/// GET /logout
pub async fn logout(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    if let Some(identity) = viewer.0 {
        state.sessions.destroy(identity.session_id).await?;
        tracing::info!(user_id = identity.user.id, "User signed out");
    }

    let mut response = redirect("/");
    response.add_cookie(&removal_cookie())?;
    Ok(response)
}
