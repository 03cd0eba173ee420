pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Category 0191... not found",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Structured details, e.g. per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Error type shared by every HTTP handler in the workspace.
///
/// Domain crates define their own `thiserror` enums and convert into this one;
/// the status code and `ErrorCode` are decided here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON parsing error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query string error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),

    /// Driver-level failure. The driver's message is returned to the client as-is.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn into_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            AppError::SerdeJson(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(ErrorCode::SerdeJsonError, e.to_string()),
            ),
            AppError::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(ErrorCode::IoError, ErrorCode::IoError.default_message())
                    .with_details(serde_json::json!(e.to_string())),
            ),
            AppError::JsonExtractorRejection(e) => {
                // Unparseable bodies and missing/mistyped fields are client input errors.
                let status = match e {
                    JsonRejection::MissingJsonContentType(_) => e.status(),
                    _ => StatusCode::BAD_REQUEST,
                };
                (
                    status,
                    ErrorResponse::new(ErrorCode::JsonExtraction, e.body_text()),
                )
            }
            AppError::QueryExtractorRejection(e) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::ValidationError, e.body_text()),
            ),
            AppError::ValidationError(e) => {
                let details = serde_json::to_value(&e).unwrap_or(serde_json::Value::Null);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        ErrorCode::ValidationError,
                        ErrorCode::ValidationError.default_message(),
                    )
                    .with_details(details),
                )
            }
            AppError::UuidError(e) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::InvalidUuid, format!("Invalid UUID: {e}")),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::ValidationError, msg),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(ErrorCode::Unauthorized, msg),
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new(ErrorCode::Forbidden, msg),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new(ErrorCode::NotFound, msg),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse::new(ErrorCode::Conflict, msg),
            ),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new(ErrorCode::UnprocessableEntity, msg),
            ),
            AppError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(ErrorCode::DatabaseError, msg),
            ),
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(ErrorCode::InternalError, msg),
            ),
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new(ErrorCode::ServiceUnavailable, msg),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_parts();

        if status.is_server_error() {
            tracing::error!(
                error_code = body.code,
                status = status.as_u16(),
                "{}",
                body.message
            );
        } else {
            tracing::info!(
                error_code = body.code,
                status = status.as_u16(),
                "{}",
                body.message
            );
        }

        (status, Json(body)).into_response()
    }
}

/// Builds an error response outside of the `AppError` flow, e.g. in fallbacks.
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(error_code, message))).into_response()
}
