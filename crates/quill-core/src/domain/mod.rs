//! Domain entities - the core business objects.

mod comment;
mod post;
mod user;

pub use comment::{AuthoredComment, Comment, NewComment};
pub use post::{NewPost, Post, PostChanges, publish_date};
pub use user::{NewUser, Role, User};
