//! Server-rendered pages.

use actix_web::{HttpResponse, http::header::ContentType};
use askama::Template;
use sha2::{Digest, Sha256};

use quill_core::AuthorizationPolicy;
use quill_core::domain::{AuthoredComment, Post, User};
use quill_shared::{CommentForm, LoginForm, PostForm, RegisterForm};

use crate::middleware::error::AppResult;

/// Navigation bar state, shared by every page.
pub struct Nav {
    pub user_name: Option<String>,
    pub can_author: bool,
    /// Show sign-in or sign-out links. Off where the viewer is unknown.
    pub account_links: bool,
}

impl Nav {
    pub fn new(viewer: Option<&User>, policy: &AuthorizationPolicy) -> Self {
        Self {
            user_name: viewer.map(|user| user.name.clone()),
            can_author: policy.can_author_posts(viewer),
            account_links: true,
        }
    }

    /// Site links only. Error responses are built without the request, so
    /// they cannot tell a signed-in viewer from a visitor.
    pub fn neutral() -> Self {
        Self {
            user_name: None,
            can_author: false,
            account_links: false,
        }
    }
}

/// Gravatar image for an email address: 100px, rated G, retro fallback.
pub fn gravatar_url(email: &str) -> String {
    let hash = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{hash:x}?s=100&r=g&d=retro")
}

/// A comment as the post page shows it.
pub struct CommentView {
    pub text: String,
    pub author_name: String,
    pub avatar_url: String,
}

impl From<AuthoredComment> for CommentView {
    fn from(entry: AuthoredComment) -> Self {
        Self {
            avatar_url: gravatar_url(&entry.author_email),
            text: entry.comment.text,
            author_name: entry.author_name,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub nav: Nav,
    pub posts: Vec<Post>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub nav: Nav,
    pub form: RegisterForm,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub nav: Nav,
    pub form: LoginForm,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostPage {
    pub nav: Nav,
    pub post: Post,
    pub comments: Vec<CommentView>,
    pub form: CommentForm,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "make-post.html")]
pub struct MakePostPage {
    pub nav: Nav,
    pub form: PostForm,
    pub errors: Vec<String>,
    pub is_edit: bool,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutPage {
    pub nav: Nav,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactPage {
    pub nav: Nav,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub nav: Nav,
    pub status: u16,
    pub title: String,
    pub detail: Option<String>,
}

/// Render a page into a 200 HTML response.
pub fn render<T: Template>(page: &T) -> AppResult<HttpResponse> {
    let html = page.render()?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravatar_url_normalizes_email() {
        let url = gravatar_url("  Ada@Example.COM ");

        assert_eq!(url, gravatar_url("ada@example.com"));
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?s=100&r=g&d=retro"));
    }

    #[test]
    fn test_gravatar_hash_is_sha256_hex() {
        let url = gravatar_url("ada@example.com");
        let hash = url
            .trim_start_matches("https://www.gravatar.com/avatar/")
            .split('?')
            .next()
            .unwrap();

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
