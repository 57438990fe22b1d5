//! Database rows and the queries over them.
//!
//! Constraints (required fields, uniqueness, ownership) live in the schema, so
//! violations come back from SQLite as [`sqlx::Error::Database`] and are passed
//! to the caller untouched.

mod follows;
mod likes;
mod message;
mod user;

use sqlx::error::ErrorKind;
use thiserror::Error;

pub use likes::toggle_like;
pub use message::{Message, NewMessage, Warble, MAX_MESSAGE_LEN};
pub use user::{NewUser, ProfileUpdate, User, UserStats, DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),
}

impl ModelError {
    pub fn is_integrity(&self) -> bool {
        match self {
            ModelError::Database(err) => is_integrity_error(err),
            ModelError::PasswordHash(_) => false,
        }
    }
}

/// True for unique, not-null, foreign-key and check violations.
pub fn is_integrity_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => matches!(
            db_err.kind(),
            ErrorKind::UniqueViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::CheckViolation
        ),
        _ => false,
    }
}
