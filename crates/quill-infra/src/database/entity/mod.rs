//! SeaORM entities mirroring the three blog tables.

pub mod comment;
pub mod post;
pub mod user;
