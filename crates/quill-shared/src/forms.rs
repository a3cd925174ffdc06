//! Form payloads posted by the HTML pages.
//!
//! Every field defaults to empty so a malformed submission still
//! deserializes; `error_messages` decides what is acceptable. Handlers call
//! `normalize` first so surrounding whitespace never counts as content.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{self, Field, web_url};

fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 250))]
    pub name: String,
    #[validate(length(min = 1, max = 250), email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 1, max = 250))]
    pub password: String,
}

impl RegisterForm {
    /// Trims everything except the password.
    pub fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.email);
    }

    pub fn error_messages(&self) -> Vec<String> {
        validation::messages(
            self.validate(),
            &[
                Field::new("name", "Name", &self.name),
                Field::new("email", "Email", &self.email),
                Field::new("password", "Password", &self.password),
            ],
        )
    }
}

/// Sign-in form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 250), email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 1, max = 250))]
    pub password: String,
}

impl LoginForm {
    pub fn normalize(&mut self) {
        trim(&mut self.email);
    }

    pub fn error_messages(&self) -> Vec<String> {
        validation::messages(
            self.validate(),
            &[
                Field::new("email", "Email", &self.email),
                Field::new("password", "Password", &self.password),
            ],
        )
    }
}

/// Create/edit post form. `author` is only shown when editing; new posts take
/// the author's name from the signed-in account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(length(min = 1, max = 250))]
    pub title: String,
    #[validate(length(min = 1, max = 250))]
    pub subtitle: String,
    #[validate(length(min = 1, max = 250), url, custom(function = "web_url"))]
    pub img_url: String,
    #[validate(length(max = 250))]
    pub author: String,
    #[validate(length(min = 1))]
    pub body: String,
}

impl PostForm {
    pub fn normalize(&mut self) {
        trim(&mut self.title);
        trim(&mut self.subtitle);
        trim(&mut self.img_url);
        trim(&mut self.author);
        trim(&mut self.body);
    }

    pub fn error_messages(&self) -> Vec<String> {
        validation::messages(
            self.validate(),
            &[
                Field::new("title", "Blog post title", &self.title),
                Field::new("subtitle", "Subtitle", &self.subtitle),
                Field::new("img_url", "Blog image URL", &self.img_url),
                Field::new("author", "Author", &self.author),
                Field::new("body", "Blog content", &self.body),
            ],
        )
    }
}

/// Comment box under a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(length(min = 1))]
    pub comment: String,
}

impl CommentForm {
    pub fn normalize(&mut self) {
        trim(&mut self.comment);
    }

    pub fn error_messages(&self) -> Vec<String> {
        validation::messages(
            self.validate(),
            &[Field::new("comment", "Comment", &self.comment)],
        )
    }
}
