//! Middleware modules - error mapping and session extraction.

pub mod auth;
pub mod error;
