//! # Storage Errors
//!
//! Every repository call returns [`DbResult`]. Callers above this crate see
//! one of two projections:
//!
//! ```text
//!   sqlx::Error ──► DbError ──┬──► StoreError   sale engine: Unavailable | Rejected
//!                             └──► ApiError     server: {code, message}
//! ```
//!
//! SQLite reports constraint failures as text; sqlx classifies the common
//! ones by [`ErrorKind`]. Trigger aborts (`RAISE(ABORT, ...)`) arrive
//! unclassified and are recognised by message.

use spares_core::StoreError;
use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// An owner-scoped update or delete matched no row, or a lookup that
    /// must succeed came back empty.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A shop email is already registered.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A part points at a shop that does not exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint or the sales-history triggers refused the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value no longer parses into its domain type (money text,
    /// GST slab).
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Storage itself is down or broken, rather than refusing one write.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_)
                | DbError::PoolExhausted
                | DbError::Internal(_)
                | DbError::MigrationFailed(_)
        )
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    // "UNIQUE constraint failed: shop_owners.email"
                    ErrorKind::UniqueViolation => {
                        let column = message.rsplit(": ").next().unwrap_or_default();
                        DbError::duplicate(column, "unknown")
                    }
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::ConstraintViolation(message)
                    }
                    _ if message.contains("append-only") => DbError::ConstraintViolation(message),
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DbError::InvalidData(err.to_string())
            }

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// The sale engine only distinguishes "storage down" from "storage said no".
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if err.is_unavailable() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Rejected(err.to_string())
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let down: StoreError = DbError::PoolExhausted.into();
        assert!(matches!(down, StoreError::Unavailable(_)));

        let refused: StoreError = DbError::ConstraintViolation("append-only".into()).into();
        assert!(matches!(refused, StoreError::Rejected(_)));
    }

    #[test]
    fn test_pool_closed_is_connection_failure() {
        let err = DbError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, DbError::ConnectionFailed(_)));
        assert!(err.is_unavailable());
    }
}
