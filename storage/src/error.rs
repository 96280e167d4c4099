//! Error types for storage operations.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors surfaced by the write pipeline and the read queries.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Input rejected before anything was written.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Referential integrity or derived-count violation.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Unique constraint violation.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StorageError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StorageError::Validation(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::Database(db_err) => Some((db_err.kind(), db_err.message().to_string())),
            _ => None,
        };

        match kind {
            Some((ErrorKind::ForeignKeyViolation, msg)) => StorageError::Integrity(msg),
            Some((ErrorKind::UniqueViolation, msg)) => StorageError::Conflict(msg),
            Some((ErrorKind::CheckViolation, msg)) => StorageError::Validation(msg),
            Some((ErrorKind::NotNullViolation, msg)) => StorageError::Validation(msg),
            _ => StorageError::Database(err),
        }
    }
}
