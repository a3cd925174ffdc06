//! # Quill Shared
//!
//! Form payloads submitted by the blog's HTML pages, with the validation
//! rules each form enforces before anything reaches the database.

pub mod forms;
mod validation;

pub use forms::{CommentForm, LoginForm, PostForm, RegisterForm};
