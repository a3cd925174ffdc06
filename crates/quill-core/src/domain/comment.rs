use serde::{Deserialize, Serialize};

/// Comment entity - a reader's reply under a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub author_id: i32,
    pub post_id: i32,
    pub text: String,
}

/// A comment about to be inserted.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: i32,
    pub post_id: i32,
    pub text: String,
}

/// A comment joined with the account of the user who wrote it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoredComment {
    pub comment: Comment,
    pub author_name: String,
    /// Used for the commenter's avatar; never rendered as text.
    pub author_email: String,
}
