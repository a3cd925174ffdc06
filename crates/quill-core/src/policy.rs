//! Authorization policy - who may do what to posts.

use crate::domain::User;
use crate::error::DomainError;

/// Resolves post permissions from the viewer's role.
///
/// Anonymous viewers are represented as `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationPolicy {
    /// Apply the authoring rule to deletions as well. Off by default, which
    /// leaves the delete route open to any caller.
    pub delete_requires_privilege: bool,
}

impl AuthorizationPolicy {
    pub fn new(delete_requires_privilege: bool) -> Self {
        Self {
            delete_requires_privilege,
        }
    }

    /// Creating and editing posts is reserved to admins.
    pub fn can_author_posts(&self, viewer: Option<&User>) -> bool {
        viewer.is_some_and(User::is_admin)
    }

    pub fn can_delete_posts(&self, viewer: Option<&User>) -> bool {
        !self.delete_requires_privilege || self.can_author_posts(viewer)
    }

    /// Any signed-in user may comment.
    pub fn can_comment(&self, viewer: Option<&User>) -> bool {
        viewer.is_some()
    }

    pub fn ensure_can_author(&self, viewer: Option<&User>) -> Result<(), DomainError> {
        if self.can_author_posts(viewer) {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }

    pub fn ensure_can_delete(&self, viewer: Option<&User>) -> Result<(), DomainError> {
        if self.can_delete_posts(viewer) {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }
}
