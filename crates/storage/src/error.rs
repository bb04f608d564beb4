//! Storage error types

use thiserror::Error;

/// Errors raised by a [`StudentStore`](crate::StudentStore) backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// No student with the given id
    #[error("no student found with id {0}")]
    NotFound(i64),

    /// Another student already uses this email
    #[error("student with email {0} already exists")]
    DuplicateEmail(String),

    /// A by-id read failed for a reason other than a missing row
    #[error("query error: {0}")]
    QueryError(#[source] sqlx::Error),

    /// Delete found the row but removed nothing
    #[error("failed to delete student with id {0}")]
    DeleteFailed(i64),

    /// The database directory could not be created
    #[error("cannot prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    /// Any other driver or connectivity failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

