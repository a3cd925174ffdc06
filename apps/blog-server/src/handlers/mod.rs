//! HTTP handlers and route configuration.

mod auth;
mod health;
mod pages;
mod posts;

use actix_web::{HttpResponse, http::header, web};

/// Body size limits plus every route. Form submissions up to
/// `max_form_bytes` are accepted.
pub fn configure(max_form_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::FormConfig::default().limit(max_form_bytes))
            .app_data(web::PayloadConfig::new(max_form_bytes));
        configure_routes(cfg);
    }
}

/// Configure all application routes.
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Public pages
        .route("/", web::get().to(posts::list_posts))
        .route("/about", web::get().to(pages::about))
        .route("/contact", web::get().to(pages::contact))
        .route("/health", web::get().to(health::health_check))
        // Accounts
        .service(
            web::resource("/register")
                .route(web::get().to(auth::register_form))
                .route(web::post().to(auth::register)),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_form))
                .route(web::post().to(auth::login)),
        )
        .route("/logout", web::get().to(auth::logout))
        // Posts and comments
        .service(
            web::resource("/post/{id}")
                .route(web::get().to(posts::show_post))
                .route(web::post().to(posts::add_comment)),
        )
        .service(
            web::resource("/new-post")
                .route(web::get().to(posts::new_post_form))
                .route(web::post().to(posts::create_post)),
        )
        .service(
            web::resource("/edit-post/{id}")
                .route(web::get().to(posts::edit_post_form))
                .route(web::post().to(posts::update_post)),
        )
        .route("/delete/{id}", web::get().to(posts::delete_post));
}

/// 302 redirect to `location`.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}
