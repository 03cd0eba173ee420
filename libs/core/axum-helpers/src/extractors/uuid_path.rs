//! UUID path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Parses the single `{id}` path segment as a UUID.
///
/// A malformed id is a 400 with an `INVALID_UUID` style message instead of
/// axum's plain-text path rejection.
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        Uuid::parse_str(&raw)
            .map(UuidPath)
            .map_err(|_| AppError::BadRequest(format!("Invalid UUID: {raw}")).into_response())
    }
}
