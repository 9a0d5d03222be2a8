//! Store error types shared by the entity-access traits

use thiserror::Error;

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("{field} is already taken")]
    Conflict { field: &'static str },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Map a unique-constraint violation onto a field-level conflict,
    /// leaving other database errors untouched.
    pub fn from_unique_violation(err: sqlx::Error, field: &'static str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict { field }
            }
            _ => StoreError::Database(err),
        }
    }
}
