use super::jwt::JwtAuth;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

/// Token from `Authorization: Bearer <token>`, if present and non-empty.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Attaches [`JwtClaims`](super::JwtClaims) to the request extensions when a
/// valid bearer token is present. Requests without one, or with a bad one,
/// continue anonymously; authorization is decided downstream.
///
/// ```ignore
/// let app = Router::new()
///     .route("/query", post(graphql_handler))
///     .layer(axum::middleware::from_fn_with_state(jwt_auth, optional_jwt_auth_middleware));
/// ```
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(request.headers()) {
        match auth.validate(token) {
            Ok(claims) => {
                tracing::debug!(user_id = %claims.id, "bearer token accepted");
                request.extensions_mut().insert(claims);
            }
            Err(e) => tracing::debug!(error = %e, "bearer token rejected"),
        }
    }

    next.run(request).await
}
