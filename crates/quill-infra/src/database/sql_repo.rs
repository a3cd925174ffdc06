//! SeaORM repository implementations.
//!
//! Every write runs inside its own transaction; dropping the transaction on an
//! early return rolls it back.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};

use quill_core::domain::{
    AuthoredComment, Comment, NewComment, NewPost, NewUser, Post, PostChanges, Role, User,
};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::sql_base::{SqlBaseRepository, map_db_err};

/// SQL user repository.
pub type SqlUserRepository = SqlBaseRepository<UserEntity>;

/// SQL post repository.
pub type SqlPostRepository = SqlBaseRepository<PostEntity>;

/// SQL comment repository.
pub type SqlCommentRepository = SqlBaseRepository<CommentEntity>;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let masked_local = match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}@{domain}")
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn register(&self, new_user: NewUser) -> Result<User, RepoError> {
        let attempt = self.insert_account(new_user.clone()).await;
        if !matches!(attempt, Err(RepoError::Constraint(_))) {
            return attempt;
        }
        if self.find_by_email(&new_user.email).await?.is_some() {
            return attempt;
        }

        // Only the single-admin index can reject a fresh email: a concurrent
        // registration claimed the admin role after our count.
        tracing::warn!(
            user_email = %mask_email(&new_user.email),
            "Admin role claimed concurrently, registering as reader"
        );
        self.insert_account(new_user).await
    }
}

impl SqlUserRepository {
    /// One registration transaction: email check, role decision, insert.
    async fn insert_account(&self, new_user: NewUser) -> Result<User, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let taken = UserEntity::find()
            .filter(user::Column::Email.eq(new_user.email.as_str()))
            .one(&txn)
            .await
            .map_err(map_db_err)?;
        if taken.is_some() {
            return Err(RepoError::Constraint("users.email".to_string()));
        }

        let existing = UserEntity::find().count(&txn).await.map_err(map_db_err)?;
        let role = Role::for_new_account(existing);

        let model = user::new_active_model(new_user, role)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(user_id = model.id, %role, "User registered");
        Ok(model.into())
    }
}

#[async_trait]
impl PostRepository for SqlPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = post::ActiveModel::from(new_post)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(post_id = model.id, author_id = model.author_id, "Post created");
        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let existing = PostEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active = existing.into_active_model();
        active.apply(changes);
        let model = active.update(&txn).await.map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(post_id = model.id, "Post updated");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let removed_comments = CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        let result = PostEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            post_id = id,
            comments = removed_comments.rows_affected,
            "Post deleted"
        );
        Ok(())
    }

    async fn find_by_author(&self, author_id: i32) -> Result<Vec<Post>, RepoError> {
        let Some(author) = UserEntity::find_by_id(author_id)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(Vec::new());
        };

        let result = author
            .find_related(PostEntity)
            .order_by_asc(post::Column::Id)
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for SqlCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = comment::ActiveModel::from(new_comment)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(comment_id = model.id, post_id = model.post_id, "Comment stored");
        Ok(model.into())
    }

    async fn find_by_post(&self, post_id: i32) -> Result<Vec<AuthoredComment>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Id)
            .find_also_related(UserEntity)
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| {
                let (author_name, author_email) =
                    author.map(|u| (u.name, u.email)).unwrap_or_default();
                AuthoredComment {
                    comment: comment.into(),
                    author_name,
                    author_email,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ada@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
