//! Database-specific error types
//!
//! Classifies `sqlx` errors by the Postgres constraint that fired so the
//! service layer can branch on known sentinels (duplicate row, missing
//! referenced row) without string matching on driver messages.

use thiserror::Error;

/// Database operation errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Query expected a row and got none
    #[error("Row not found")]
    RowNotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation: {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// Check constraint violation
    #[error("Check constraint violation: {constraint}")]
    CheckViolation { constraint: String },

    /// Connection pool exhausted
    #[error("Connection pool timed out")]
    PoolExhausted,

    /// Generic database error
    #[error("Database error: {message}")]
    Other { message: String },
}

impl DatabaseError {
    /// Name of the violated constraint, if any
    pub fn constraint(&self) -> Option<&str> {
        match self {
            Self::UniqueViolation { constraint }
            | Self::ForeignKeyViolation { constraint }
            | Self::CheckViolation { constraint } => Some(constraint.as_str()),
            _ => None,
        }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation { .. })
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::RowNotFound,
            sqlx::Error::PoolTimedOut => Self::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => Self::UniqueViolation { constraint },
                    sqlx::error::ErrorKind::ForeignKeyViolation => {
                        Self::ForeignKeyViolation { constraint }
                    }
                    sqlx::error::ErrorKind::CheckViolation => Self::CheckViolation { constraint },
                    _ => Self::Other {
                        message: db_err.message().to_string(),
                    },
                }
            }
            other => Self::Other {
                message: other.to_string(),
            },
        }
    }
}
