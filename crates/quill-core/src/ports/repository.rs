use async_trait::async_trait;

use crate::domain::{
    AuthoredComment, Comment, NewComment, NewPost, NewUser, Post, PostChanges, User,
};
use crate::error::RepoError;

/// Generic repository trait defining the shared read operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Every stored entity, in storage order.
    async fn find_all(&self) -> Result<Vec<T>, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Insert a new account. The first account ever stored becomes the admin.
    /// A taken email is reported as `RepoError::Constraint`.
    async fn register(&self, user: NewUser) -> Result<User, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Overwrite the editable fields of a post.
    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError>;

    /// Delete a post together with its comments.
    async fn delete(&self, id: i32) -> Result<(), RepoError>;

    /// Posts owned by a user, loaded through the user relation.
    async fn find_by_author(&self, author_id: i32) -> Result<Vec<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i32> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments under one post with their authors' names, oldest first.
    async fn find_by_post(&self, post_id: i32) -> Result<Vec<AuthoredComment>, RepoError>;
}
