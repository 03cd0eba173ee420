//! JSON body extractor that runs `validator` rules before the handler sees the payload.

use crate::errors::{AppError, ErrorCode, ErrorResponse};
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// Deserializes and validates a JSON body.
///
/// A body that is not valid JSON (or misses a required field) is rejected as
/// [`AppError::JsonExtractorRejection`]. A body that parses but breaks a
/// `#[validate]` rule yields 400 with per-field `details`.
///
/// ```ignore
/// async fn create(ValidatedJson(input): ValidatedJson<CreateCategory>) -> impl IntoResponse {
///     // input.validate() already passed
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

fn field_details(errors: &ValidationErrors) -> serde_json::Value {
    let fields = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let entries = errs
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect::<Vec<_>>();
            (field.to_string(), serde_json::Value::Array(entries))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(fields)
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        if let Err(errors) = data.validate() {
            tracing::info!(
                error_code = ErrorCode::ValidationError.code(),
                "request body failed validation"
            );
            let body = ErrorResponse::new(
                ErrorCode::ValidationError,
                ErrorCode::ValidationError.default_message(),
            )
            .with_details(field_details(&errors));
            return Err((StatusCode::BAD_REQUEST, axum::Json(body)).into_response());
        }

        Ok(ValidatedJson(data))
    }
}
