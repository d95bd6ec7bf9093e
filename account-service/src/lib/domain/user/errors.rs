use thiserror::Error;

use crate::user::models::UserId;
use crate::user::validation::ValidationError;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid user ID format: {0}")]
    InvalidFormat(String),
}

/// Error raised while constructing a repository backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryInitError {
    #[error("Failed to connect to storage: {0}")]
    Connection(String),

    #[error("Failed to run migrations: {0}")]
    Migration(String),

    #[error("Storage construction task failed: {0}")]
    Aborted(String),
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(UserId),

    #[error("User not found with nickname: {0}")]
    NotFoundByNickname(String),

    #[error("User not found with email: {0}")]
    NotFoundByEmail(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    // Infrastructure errors
    #[error("Operation not supported by this storage backend: {0}")]
    Unsupported(&'static str),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] RepositoryInitError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
