/// Gateway error type
///
/// Every handler returns `Result<_, AppError>`; downstream gRPC statuses are
/// translated with the shared status table.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use error_types::http::{error_code_for, http_status_for};
use error_types::HttpErrorResponse;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("upload exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("{0} unavailable")]
    Unavailable(&'static str),

    #[error("{}", .0.message())]
    Upstream(#[from] tonic::Status),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::BadRequest(_) => "INVALID_INPUT",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Upstream(status) => error_code_for(status.code()),
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|f| f.to_string())
            .collect();
        fields.sort();
        AppError::BadRequest(format!("invalid {}", fields.join(", ")))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(status) => StatusCode::from_u16(http_status_for(status.code()))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, detail = ?self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = match self {
            AppError::Upstream(s) => HttpErrorResponse::from_status(s),
            AppError::Internal(_) => {
                HttpErrorResponse::new(status.as_u16(), self.code(), "internal server error")
            }
            other => HttpErrorResponse::new(status.as_u16(), other.code(), other.to_string()),
        };
        HttpResponse::build(status).json(body)
    }
}
