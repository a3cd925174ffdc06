//! Errors raised below the HTTP layer.

use thiserror::Error;

/// Rule violations detected by the domain.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} #{id} does not exist")]
    NotFound { entity_type: &'static str, id: i32 },

    /// The viewer's role does not permit the action.
    #[error("Not authorised")]
    Unauthorized,
}

/// Storage failures, as reported by a repository.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("storage unreachable: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    /// The row addressed by an update or delete is gone.
    #[error("row not found")]
    NotFound,

    /// A unique or foreign key constraint rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),
}
