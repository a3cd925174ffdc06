use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};

use quill_core::AuthorizationPolicy;
use quill_core::domain::{NewPost, NewUser, Post, Role, User, publish_date};
use quill_core::ports::{
    BaseRepository, CommentRepository, PasswordService, PostRepository, UserRepository,
};
use quill_infra::Argon2PasswordService;

use crate::config::{DEFAULT_MAX_FORM_BYTES, SessionConfig};
use crate::handlers::configure;
use crate::middleware::auth::{SESSION_COOKIE, start_session};
use crate::state::AppState;
use crate::views::gravatar_url;

macro_rules! test_app {
    ($state:expr) => {
        test_app!($state, DEFAULT_MAX_FORM_BYTES)
    };
    ($state:expr, $max_form_bytes:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure($max_form_bytes)),
        )
        .await
    };
}

async fn test_state(policy: AuthorizationPolicy) -> AppState {
    // A single connection keeps every query on the same in-memory database.
    let opts = ConnectOptions::new("sqlite::memory:")
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false)
        .to_owned();
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    AppState::builder(Arc::new(db), SessionConfig::default())
        .passwords(Arc::new(Argon2PasswordService::with_params(1024, 1, 1).unwrap()))
        .policy(policy)
        .build()
}

/// Store an account directly and open a session for it.
async fn seed_user(state: &AppState, name: &str) -> (User, Cookie<'static>) {
    let password_hash = state.passwords.hash("secret").unwrap();
    let user = state
        .users
        .register(NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash,
        })
        .await
        .unwrap();
    let cookie = start_session(state, &user).await.unwrap();
    (user, cookie)
}

async fn seed_post(state: &AppState, author: &User, title: &str) -> Post {
    state
        .posts
        .create(NewPost::new(
            author.id,
            author.name.clone(),
            title.to_string(),
            "A subtitle".to_string(),
            "<p>Hello there</p>".to_string(),
            "https://example.com/cover.png".to_string(),
            chrono::Local::now().date_naive(),
        ))
        .await
        .unwrap()
}

fn post_form(uri: &str, fields: &[(&str, &str)]) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_form(fields)
}

fn valid_post_fields(title: &str) -> Vec<(&str, &str)> {
    vec![
        ("title", title),
        ("subtitle", "Thoughts"),
        ("img_url", "https://example.com/cover.png"),
        ("body", "<p>Body text</p>"),
    ]
}

fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE && !c.value().is_empty())
        .map(|c| c.into_owned())
}

fn location<B>(resp: &ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(resp: ServiceResponse) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[actix_web::test]
async fn test_registration_signs_in_and_first_account_is_admin() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let app = test_app!(state);

    let req = post_form(
        "/register",
        &[("name", "Ada"), ("email", "ada@example.com"), ("password", "pw")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    let cookie = session_cookie(&resp).expect("registration should sign in");

    let users: Vec<User> = state.users.find_all().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role, Role::Admin);
    assert_ne!(users[0].password_hash, "pw");

    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Signed in as Ada"));
    assert!(body.contains("Create New Post"));
}

#[actix_web::test]
async fn test_second_account_is_reader() {
    let state = test_state(AuthorizationPolicy::default()).await;
    seed_user(&state, "Ada").await;
    let app = test_app!(state);

    let req = post_form(
        "/register",
        &[("name", "Bob"), ("email", "bob@example.com"), ("password", "pw")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let bob = state.users.find_by_email("bob@example.com").await.unwrap().unwrap();
    assert_eq!(bob.role, Role::Reader);
}

#[actix_web::test]
async fn test_duplicate_registration_rerenders_form() {
    let state = test_state(AuthorizationPolicy::default()).await;
    seed_user(&state, "Ada").await;
    let app = test_app!(state);

    let req = post_form(
        "/register",
        &[("name", "Impostor"), ("email", "ada@example.com"), ("password", "pw")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_none());
    let body = body_text(resp).await;
    assert!(body.contains("already signed in with that account"));

    let users: Vec<User> = state.users.find_all().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Ada");
}

#[actix_web::test]
async fn test_invalid_registration_stores_nothing() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let app = test_app!(state);

    let req = post_form("/register", &[("name", "Ada"), ("email", "not-an-email")]).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Invalid email address."));
    assert!(body.contains("Password is required."));

    let users: Vec<User> = state.users.find_all().await.unwrap();
    assert!(users.is_empty());
}

#[actix_web::test]
async fn test_login_with_unknown_email() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let app = test_app!(state);

    let req = post_form(
        "/login",
        &[("email", "ghost@example.com"), ("password", "secret")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_none());
    assert!(body_text(resp).await.contains("Email does not exist."));
}

#[actix_web::test]
async fn test_login_with_wrong_password() {
    let state = test_state(AuthorizationPolicy::default()).await;
    seed_user(&state, "Ada").await;
    let app = test_app!(state);

    let req = post_form(
        "/login",
        &[("email", "ada@example.com"), ("password", "wrong")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_none());
    assert!(
        body_text(resp)
            .await
            .contains("Password Incorrect. please try again.")
    );
}

#[actix_web::test]
async fn test_login_validation_keeps_typed_email() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let app = test_app!(state);

    let req = post_form("/login", &[("email", "ada.example.com"), ("password", "")]).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Invalid email address."));
    assert!(body.contains("Password is required."));
    assert!(body.contains(r#"value="ada.example.com""#));
}

#[actix_web::test]
async fn test_login_then_logout() {
    let state = test_state(AuthorizationPolicy::default()).await;
    seed_user(&state, "Ada").await;
    let app = test_app!(state);

    let req = post_form(
        "/login",
        &[("email", "ada@example.com"), ("password", "secret")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let cookie = session_cookie(&resp).expect("login should set a session cookie");

    let req = test::TestRequest::get()
        .uri("/new-post")
        .cookie(cookie.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    // The old cookie no longer resolves to a session.
    let req = test::TestRequest::get()
        .uri("/new-post")
        .cookie(cookie)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_only_admin_may_create_posts() {
    let state = test_state(AuthorizationPolicy::default()).await;
    seed_user(&state, "Ada").await;
    let (_, reader) = seed_user(&state, "Bob").await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/new-post")
        .cookie(reader.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "Not Authorised");

    // Refused regardless of what the form holds.
    let submissions = [valid_post_fields("Sneaky"), vec![("junk", "value")]];
    for fields in &submissions {
        let req = post_form("/new-post", fields)
            .cookie(reader.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(resp).await, "Not Authorised");

        let req = post_form("/new-post", fields).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let posts: Vec<Post> = state.posts.find_all().await.unwrap();
    assert!(posts.is_empty());
}

#[actix_web::test]
async fn test_author_routes_refuse_before_reading_body() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (admin, _) = seed_user(&state, "Ada").await;
    let (_, reader) = seed_user(&state, "Bob").await;
    let post = seed_post(&state, &admin, "Draft").await;
    let app = test_app!(state);

    let json = r#"{"title":"Sneaky","body":"<p>x</p>"}"#;
    for uri in ["/new-post".to_string(), format!("/edit-post/{}", post.id)] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(json)
            .cookie(reader.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body_text(resp).await, "Not Authorised");

        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(json)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body_text(resp).await, "Not Authorised");
    }

    let posts: Vec<Post> = state.posts.find_all().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Draft");
}

#[actix_web::test]
async fn test_long_post_body_is_accepted() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (_, cookie) = seed_user(&state, "Ada").await;
    let app = test_app!(state);

    let body = format!("<p>{}</p>", "word ".repeat(5_000));
    let mut fields = valid_post_fields("Longread");
    fields.retain(|(name, _)| *name != "body");
    fields.push(("body", body.as_str()));

    let req = post_form("/new-post", &fields).cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let posts: Vec<Post> = state.posts.find_all().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].body.len(), body.trim().len());
}

#[actix_web::test]
async fn test_form_body_limit_is_configurable() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (_, cookie) = seed_user(&state, "Ada").await;
    let app = test_app!(state, 1024);

    let body = "x".repeat(4096);
    let mut fields = valid_post_fields("Too Long");
    fields.retain(|(name, _)| *name != "body");
    fields.push(("body", body.as_str()));

    let req = post_form("/new-post", &fields).cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let req = post_form(
        "/register",
        &[("name", body.as_str()), ("email", "bob@example.com"), ("password", "pw")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let posts: Vec<Post> = state.posts.find_all().await.unwrap();
    assert!(posts.is_empty());
}

#[actix_web::test]
async fn test_over_long_title_rerenders() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (_, cookie) = seed_user(&state, "Ada").await;
    let app = test_app!(state);

    let title = "t".repeat(300);
    let req = post_form("/new-post", &valid_post_fields(&title))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        body_text(resp)
            .await
            .contains("Blog post title must be at most 250 characters.")
    );
    let posts: Vec<Post> = state.posts.find_all().await.unwrap();
    assert!(posts.is_empty());
}

#[actix_web::test]
async fn test_admin_creates_post() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (admin, cookie) = seed_user(&state, "Ada").await;
    let app = test_app!(state);

    let req = post_form("/new-post", &valid_post_fields("First Light"))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let posts: Vec<Post> = state.posts.find_all().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "First Light");
    assert_eq!(posts[0].author, "Ada");
    assert_eq!(posts[0].author_id, admin.id);
    assert_eq!(posts[0].date, publish_date(chrono::Local::now().date_naive()));

    // Titles are unique.
    let req = post_form("/new-post", &valid_post_fields("First Light"))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        body_text(resp)
            .await
            .contains("A post with that title already exists.")
    );
    let posts: Vec<Post> = state.posts.find_all().await.unwrap();
    assert_eq!(posts.len(), 1);
}

#[actix_web::test]
async fn test_invalid_post_form_rerenders() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (_, cookie) = seed_user(&state, "Ada").await;
    let app = test_app!(state);

    let req = post_form("/new-post", &[("title", "Untitled")])
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Blog content is required."));
    let posts: Vec<Post> = state.posts.find_all().await.unwrap();
    assert!(posts.is_empty());
}

#[actix_web::test]
async fn test_anonymous_comment_redirects_to_login() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (admin, _) = seed_user(&state, "Ada").await;
    let post = seed_post(&state, &admin, "Open Thread").await;
    let app = test_app!(state);

    let req = post_form(&format!("/post/{}", post.id), &[("comment", "drive-by")]).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
    let comments = state.comments.find_by_post(post.id).await.unwrap();
    assert!(comments.is_empty());
}

#[actix_web::test]
async fn test_reader_comments_on_post() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (admin, _) = seed_user(&state, "Ada").await;
    let (reader, cookie) = seed_user(&state, "Bob").await;
    let post = seed_post(&state, &admin, "Open Thread").await;
    let other = seed_post(&state, &admin, "Quiet Thread").await;
    let app = test_app!(state);

    let uri = format!("/post/{}", post.id);
    let req = post_form(&uri, &[("comment", "Lovely piece")])
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), uri);

    let comments = state.comments.find_by_post(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment.author_id, reader.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Lovely piece"));
    assert!(body.contains("Bob"));

    let req = test::TestRequest::get()
        .uri(&format!("/post/{}", other.id))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(!body.contains("Lovely piece"));
}

#[actix_web::test]
async fn test_comment_shows_commenter_avatar() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (admin, _) = seed_user(&state, "Ada").await;
    let (_, cookie) = seed_user(&state, "Bob").await;
    let post = seed_post(&state, &admin, "Open Thread").await;
    let app = test_app!(state);

    let uri = format!("/post/{}", post.id);
    let req = post_form(&uri, &[("comment", "Nice")]).cookie(cookie).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let avatar = gravatar_url("bob@example.com");
    let hash = avatar
        .trim_start_matches("https://www.gravatar.com/avatar/")
        .split('?')
        .next()
        .unwrap()
        .to_string();

    let req = test::TestRequest::get().uri(&uri).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains(&hash));
    assert!(body.contains("s=100"));
    assert!(body.contains("d=retro"));
    // The address itself is never shown.
    assert!(!body.contains("bob@example.com"));
}

#[actix_web::test]
async fn test_blank_comment_is_rejected() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (admin, cookie) = seed_user(&state, "Ada").await;
    let post = seed_post(&state, &admin, "Open Thread").await;
    let app = test_app!(state);

    let req = post_form(&format!("/post/{}", post.id), &[("comment", "")])
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Comment is required."));
    assert!(state.comments.find_by_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_missing_post_is_404() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (_, cookie) = seed_user(&state, "Ada").await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/post/42").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = post_form("/post/42", &[("comment", "hello?")])
        .cookie(cookie)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_error_page_nav_is_neutral_for_signed_in_viewer() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (_, cookie) = seed_user(&state, "Ada").await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/post/999")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_text(resp).await;
    assert!(body.contains("Not Found"));
    assert!(!body.contains(r#"href="/login""#));
    assert!(!body.contains(r#"href="/register""#));
    assert!(!body.contains(r#"href="/logout""#));
}

#[actix_web::test]
async fn test_admin_edits_post() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (admin, cookie) = seed_user(&state, "Ada").await;
    let post = seed_post(&state, &admin, "Draft").await;
    let app = test_app!(state);

    let uri = format!("/edit-post/{}", post.id);
    let req = test::TestRequest::get()
        .uri(&uri)
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Draft"));

    // Blank author keeps the stored one.
    let req = post_form(&uri, &valid_post_fields("Final"))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/post/{}", post.id));

    let edited: Post = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(edited.title, "Final");
    assert_eq!(edited.author, "Ada");
    assert_eq!(edited.author_id, admin.id);
    assert_eq!(edited.date, post.date);
}

#[actix_web::test]
async fn test_reader_cannot_edit_post() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (admin, _) = seed_user(&state, "Ada").await;
    let (_, reader) = seed_user(&state, "Bob").await;
    let post = seed_post(&state, &admin, "Draft").await;
    let app = test_app!(state);

    let req = post_form(
        &format!("/edit-post/{}", post.id),
        &valid_post_fields("Vandalised"),
    )
    .cookie(reader)
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "Not Authorised");

    let unchanged: Post = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Draft");
}

#[actix_web::test]
async fn test_delete_open_by_default() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let (admin, cookie) = seed_user(&state, "Ada").await;
    let post = seed_post(&state, &admin, "Ephemeral").await;
    let app = test_app!(state);

    let req = post_form(&format!("/post/{}", post.id), &[("comment", "first")])
        .cookie(cookie)
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/delete/{}", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let gone: Option<Post> = state.posts.find_by_id(post.id).await.unwrap();
    assert!(gone.is_none());
    assert!(state.comments.find_by_post(post.id).await.unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/delete/{}", post.id))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_delete_can_require_privilege() {
    let state = test_state(AuthorizationPolicy::new(true)).await;
    let (admin, admin_cookie) = seed_user(&state, "Ada").await;
    let (_, reader) = seed_user(&state, "Bob").await;
    let post = seed_post(&state, &admin, "Guarded").await;
    let app = test_app!(state);

    let uri = format!("/delete/{}", post.id);
    for req in [
        test::TestRequest::get().uri(&uri).to_request(),
        test::TestRequest::get().uri(&uri).cookie(reader).to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(resp).await, "Not Authorised");
    }
    let kept: Option<Post> = state.posts.find_by_id(post.id).await.unwrap();
    assert!(kept.is_some());

    let req = test::TestRequest::get()
        .uri(&uri)
        .cookie(admin_cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_stale_cookie_is_anonymous() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(Cookie::new(SESSION_COOKIE, "not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Login"));
    assert!(body.contains("No posts yet."));
}

#[actix_web::test]
async fn test_static_pages_render() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let app = test_app!(state);

    for uri in ["/about", "/contact", "/login", "/register"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::OK,
            "{uri}"
        );
    }
}

#[actix_web::test]
async fn test_health_check() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains(r#""status":"ok""#));
    assert!(body.contains(r#""database":"ok""#));
}

#[actix_web::test]
async fn test_blog_walkthrough() {
    let state = test_state(AuthorizationPolicy::default()).await;
    let app = test_app!(state);

    let register = |name: &str, email: &str| {
        post_form(
            "/register",
            &[("name", name), ("email", email), ("password", "pw")],
        )
        .to_request()
    };

    let resp = test::call_service(&app, register("Ada", "ada@example.com")).await;
    let admin = session_cookie(&resp).unwrap();

    let req = post_form("/new-post", &valid_post_fields("Hello World"))
        .cookie(admin.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let resp = test::call_service(&app, register("Bob", "bob@example.com")).await;
    let reader = session_cookie(&resp).unwrap();

    let posts: Vec<Post> = state.posts.find_all().await.unwrap();
    let uri = format!("/post/{}", posts[0].id);

    let req = post_form(&uri, &[("comment", "Welcome!")])
        .cookie(reader.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let req = test::TestRequest::get().uri("/").cookie(reader).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Hello World"));
    assert!(!body.contains("Create New Post"));

    let req = test::TestRequest::get().uri(&uri).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Welcome!"));
    assert!(body.contains("Bob"));
    assert!(body.contains("Posted by Ada"));

    let mut fields = valid_post_fields("Hello Again");
    fields.push(("author", "Ada Lovelace"));
    let req = post_form(&format!("/edit-post/{}", posts[0].id), &fields)
        .cookie(admin.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Hello Again"));
    assert!(body.contains("Posted by Ada Lovelace"));

    let req = test::TestRequest::get()
        .uri(&format!("/delete/{}", posts[0].id))
        .cookie(admin)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let req = test::TestRequest::get().uri("/").to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("No posts yet."));
    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}
