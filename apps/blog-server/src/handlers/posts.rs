use actix_web::{HttpResponse, web};

use quill_core::domain::{NewComment, NewPost, Post, PostChanges};
use quill_core::error::{DomainError, RepoError};
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository};
use quill_shared::{CommentForm, PostForm};

use super::redirect;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views::{CommentView, IndexPage, MakePostPage, Nav, PostPage, render};

pub(crate) const DUPLICATE_TITLE: &str = "A post with that title already exists.";

async fn load_post(state: &AppState, id: i32) -> AppResult<Post> {
    let post: Option<Post> = state.posts.find_by_id(id).await?;
    post.ok_or_else(|| {
        DomainError::NotFound {
            entity_type: "Post",
            id,
        }
        .into()
    })
}

async fn load_thread(state: &AppState, post_id: i32) -> AppResult<Vec<CommentView>> {
    let comments = state.comments.find_by_post(post_id).await?;
    Ok(comments.into_iter().map(CommentView::from).collect())
}

/// Author-only bodies are decoded after the policy check, so an unauthorised
/// caller learns nothing from a malformed or oversized submission.
fn decode_post_form(body: &[u8]) -> PostForm {
    let mut form: PostForm = serde_urlencoded::from_bytes(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Unreadable post form");
        PostForm::default()
    });
    form.normalize();
    form
}

/// GET /
pub async fn list_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let posts: Vec<Post> = state.posts.find_all().await?;

    render(&IndexPage {
        nav: Nav::new(viewer.user(), &state.policy),
        posts,
    })
}

/// GET /post/{id}
pub async fn show_post(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    let comments = load_thread(&state, post.id).await?;

    render(&PostPage {
        nav: Nav::new(viewer.user(), &state.policy),
        post,
        comments,
        form: CommentForm::default(),
        errors: Vec::new(),
    })
}

/// POST /post/{id}
///
/// Anonymous visitors are redirected to the login page by the [`Identity`]
/// extractor before anything is stored.
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    let mut form = form.into_inner();
    form.normalize();

    let errors = form.error_messages();
    if !errors.is_empty() {
        let comments = load_thread(&state, post.id).await?;
        return render(&PostPage {
            nav: Nav::new(Some(&identity.user), &state.policy),
            post,
            comments,
            form,
            errors,
        });
    }

    let comment = state
        .comments
        .create(NewComment {
            author_id: identity.user.id,
            post_id: post.id,
            text: form.comment,
        })
        .await?;

    tracing::info!(
        comment_id = comment.id,
        post_id = post.id,
        user_id = identity.user.id,
        "Comment added"
    );

    Ok(redirect(&format!("/post/{}", post.id)))
}

/// GET /new-post
pub async fn new_post_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    state.policy.ensure_can_author(viewer.user())?;

    render(&MakePostPage {
        nav: Nav::new(viewer.user(), &state.policy),
        form: PostForm::default(),
        errors: Vec::new(),
        is_edit: false,
    })
}

/// POST /new-post
pub async fn create_post(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    state.policy.ensure_can_author(viewer.user())?;
    // The policy only admits signed-in users.
    let Some(author) = viewer.user() else {
        return Err(DomainError::Unauthorized.into());
    };

    let form = decode_post_form(&body);
    let rejected = |form: PostForm, errors: Vec<String>| {
        render(&MakePostPage {
            nav: Nav::new(viewer.user(), &state.policy),
            form,
            errors,
            is_edit: false,
        })
    };

    let errors = form.error_messages();
    if !errors.is_empty() {
        return rejected(form, errors);
    }

    let new_post = NewPost::new(
        author.id,
        author.name.clone(),
        form.title.clone(),
        form.subtitle.clone(),
        form.body.clone(),
        form.img_url.clone(),
        chrono::Local::now().date_naive(),
    );

    match state.posts.create(new_post).await {
        Ok(post) => {
            tracing::info!(post_id = post.id, user_id = author.id, "Post published");
            Ok(redirect("/"))
        }
        Err(RepoError::Constraint(_)) => rejected(form, vec![DUPLICATE_TITLE.to_string()]),
        Err(e) => Err(e.into()),
    }
}

/// GET /edit-post/{id}
pub async fn edit_post_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state.policy.ensure_can_author(viewer.user())?;
    let post = load_post(&state, path.into_inner()).await?;

    render(&MakePostPage {
        nav: Nav::new(viewer.user(), &state.policy),
        form: PostForm {
            title: post.title,
            subtitle: post.subtitle,
            img_url: post.img_url,
            author: post.author,
            body: post.body,
        },
        errors: Vec::new(),
        is_edit: true,
    })
}

/// POST /edit-post/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<i32>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    state.policy.ensure_can_author(viewer.user())?;
    let post = load_post(&state, path.into_inner()).await?;

    let form = decode_post_form(&body);
    let rejected = |form: PostForm, errors: Vec<String>| {
        render(&MakePostPage {
            nav: Nav::new(viewer.user(), &state.policy),
            form,
            errors,
            is_edit: true,
        })
    };

    let errors = form.error_messages();
    if !errors.is_empty() {
        return rejected(form, errors);
    }

    let author = match form.author.as_str() {
        "" => post.author.clone(),
        name => name.to_string(),
    };
    let changes = PostChanges {
        title: form.title.clone(),
        subtitle: form.subtitle.clone(),
        img_url: form.img_url.clone(),
        author,
        body: form.body.clone(),
    };

    match state.posts.update(post.id, changes).await {
        Ok(updated) => {
            tracing::info!(post_id = updated.id, "Post edited");
            Ok(redirect(&format!("/post/{}", updated.id)))
        }
        Err(RepoError::Constraint(_)) => rejected(form, vec![DUPLICATE_TITLE.to_string()]),
        Err(e) => Err(e.into()),
    }
}

/// GET /delete/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state.policy.ensure_can_delete(viewer.user())?;

    let id = path.into_inner();
    match viewer.user() {
        Some(user) => tracing::info!(post_id = id, user_id = user.id, "Deleting post"),
        None => tracing::warn!(post_id = id, "Anonymous request deleting post"),
    }

    state.posts.delete(id).await?;

    Ok(redirect("/"))
}
