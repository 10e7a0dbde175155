//! HTTP error response handling
//!
//! The gateway only ever sees gRPC statuses from downstream services, so the
//! mapping here is keyed on `tonic::Code`.

use serde::{Deserialize, Serialize};
use tonic::Code;

/// Standard HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct HttpErrorResponse {
    /// HTTP status code
    pub status: u16,

    /// Error code for client handling
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Timestamp of the error
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HttpErrorResponse {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Build the response body for a downstream gRPC status
    pub fn from_status(status: &tonic::Status) -> Self {
        let http_status = http_status_for(status.code());
        let message = if http_status >= 500 {
            // Internal details stay in the logs
            "internal server error".to_string()
        } else {
            status.message().to_string()
        };
        Self::new(http_status, error_code_for(status.code()), message)
    }
}

/// HTTP status for a gRPC status code
pub fn http_status_for(code: Code) -> u16 {
    match code {
        Code::Ok => 200,
        Code::InvalidArgument | Code::OutOfRange | Code::FailedPrecondition => 400,
        Code::Unauthenticated => 401,
        Code::PermissionDenied => 403,
        Code::NotFound => 404,
        Code::AlreadyExists | Code::Aborted => 409,
        Code::ResourceExhausted => 429,
        Code::Unavailable => 503,
        Code::DeadlineExceeded => 504,
        _ => 500,
    }
}

/// Stable machine-readable error code for a gRPC status code
pub fn error_code_for(code: Code) -> &'static str {
    match code {
        Code::InvalidArgument | Code::OutOfRange | Code::FailedPrecondition => "INVALID_INPUT",
        Code::Unauthenticated => "UNAUTHENTICATED",
        Code::PermissionDenied => "FORBIDDEN",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists | Code::Aborted => "CONFLICT",
        Code::ResourceExhausted => "RATE_LIMITED",
        Code::Unavailable => "SERVICE_UNAVAILABLE",
        Code::DeadlineExceeded => "TIMEOUT",
        _ => "INTERNAL_ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_status_codes() {
        assert_eq!(http_status_for(Code::NotFound), 404);
        assert_eq!(http_status_for(Code::AlreadyExists), 409);
        assert_eq!(http_status_for(Code::Unauthenticated), 401);
        assert_eq!(http_status_for(Code::PermissionDenied), 403);
        assert_eq!(http_status_for(Code::InvalidArgument), 400);
        assert_eq!(http_status_for(Code::Internal), 500);
        assert_eq!(http_status_for(Code::Unknown), 500);
        assert_eq!(http_status_for(Code::Unavailable), 503);
    }

    #[test]
    fn test_internal_message_is_masked() {
        let body = HttpErrorResponse::from_status(&tonic::Status::internal(
            "duplicate key value violates unique constraint",
        ));
        assert_eq!(body.status, 500);
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert_eq!(body.message, "internal server error");
    }

    #[test]
    fn test_client_message_is_kept() {
        let body = HttpErrorResponse::from_status(&tonic::Status::already_exists(
            "username already taken",
        ));
        assert_eq!(body.status, 409);
        assert_eq!(body.code, "CONFLICT");
        assert_eq!(body.message, "username already taken");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "CONFLICT");
        assert!(json["timestamp"].is_string());
    }
}
