// ABOUTME: Storage error type for the user registration store
// ABOUTME: Wraps SQLite, IO and password hashing failures

use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Duplicate username: {0}")]
    DuplicateUsername(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// True when the underlying SQLite error reports that the `users` table is missing,
    /// which means `initialize()` has not been run against this database yet.
    pub fn is_uninitialized(&self) -> bool {
        match self {
            StorageError::Sqlx(sqlx::Error::Database(db_err)) => {
                db_err.message().contains("no such table")
            }
            _ => false,
        }
    }
}
