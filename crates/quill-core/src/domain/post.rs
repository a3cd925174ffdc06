use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Post entity - a published blog article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub author_id: i32,
    /// Display name of the author, stored alongside the post.
    pub author: String,
    pub title: String,
    pub subtitle: String,
    /// Human readable publish date, e.g. "August 24, 2024".
    pub date: String,
    pub body: String,
    pub img_url: String,
}

/// A post about to be inserted.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i32,
    pub author: String,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
}

impl NewPost {
    /// Create a post stamped with its author and publish date.
    pub fn new(
        author_id: i32,
        author: String,
        title: String,
        subtitle: String,
        body: String,
        img_url: String,
        published_on: NaiveDate,
    ) -> Self {
        Self {
            author_id,
            author,
            title,
            subtitle,
            date: publish_date(published_on),
            body,
            img_url,
        }
    }
}

/// Fields an edit may overwrite. The author id is never reassigned.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub subtitle: String,
    pub img_url: String,
    pub author: String,
    pub body: String,
}

/// Format a date the way posts display it: "Month DD, YYYY".
pub fn publish_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}
