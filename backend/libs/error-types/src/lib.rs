//! Shared error taxonomy for EventHub backend services
//!
//! Every service reports failures through [`ServiceError`], which maps onto a
//! small fixed set of gRPC status codes at the transport boundary. The gateway
//! turns those codes back into HTTP statuses with [`http::http_status_for`].

use thiserror::Error;
use tonic::Status;

pub mod database;
pub mod http;

pub use database::DatabaseError;
pub use http::HttpErrorResponse;

/// Core service error type used across all EventHub services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Resource not found
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// Resource already exists
    #[error("{message}")]
    Conflict { message: String },

    /// Missing or invalid credentials/session
    #[error("{message}")]
    Unauthenticated { message: String },

    /// Caller is authenticated but may not act on the resource
    #[error("not allowed to {action}")]
    PermissionDenied { action: &'static str },

    /// Invalid input provided
    #[error("{message}")]
    InvalidInput { message: String },

    /// Database operation failed
    #[error("database error")]
    Database {
        #[source]
        source: DatabaseError,
    },

    /// Internal server error (catch-all)
    #[error("internal server error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl ServiceError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create internal error from any error type
    pub fn internal<E: Into<anyhow::Error>>(error: E) -> Self {
        Self::Internal {
            source: error.into(),
        }
    }

    /// Convert to gRPC Status for service boundaries
    pub fn to_status(&self) -> Status {
        match self {
            Self::NotFound { resource } => Status::not_found(format!("{} not found", resource)),
            Self::Conflict { message } => Status::already_exists(message),
            Self::Unauthenticated { message } => Status::unauthenticated(message),
            Self::PermissionDenied { action } => {
                Status::permission_denied(format!("not allowed to {}", action))
            }
            Self::InvalidInput { message } => Status::invalid_argument(message),
            // Don't expose database details to clients
            Self::Database { .. } => Status::internal("database operation failed"),
            Self::Internal { .. } => Status::internal("internal server error"),
        }
    }

    /// Log error with appropriate level and context
    pub fn log(&self) {
        match self {
            Self::NotFound { .. } | Self::InvalidInput { .. } | Self::Conflict { .. } => {
                tracing::debug!(error = %self, "Client error");
            }
            Self::Unauthenticated { .. } | Self::PermissionDenied { .. } => {
                tracing::warn!(error = %self, "Authorization failure");
            }
            Self::Database { source } => {
                tracing::error!(error = %source, "Database error");
            }
            Self::Internal { source } => {
                tracing::error!(error = ?source, "Server error");
            }
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::RowNotFound => Self::NotFound {
                resource: "resource",
            },
            DatabaseError::UniqueViolation { .. } => Self::Conflict {
                message: "resource already exists".to_string(),
            },
            // The referenced row is missing
            DatabaseError::ForeignKeyViolation { .. } => Self::NotFound {
                resource: "referenced resource",
            },
            DatabaseError::CheckViolation { constraint } => Self::InvalidInput {
                message: format!("constraint violated: {}", constraint),
            },
            other => Self::Database { source: other },
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::from(err).into()
    }
}

/// Logs once and converts, so gRPC handlers can use `?` directly.
impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        err.log();
        err.to_status()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
