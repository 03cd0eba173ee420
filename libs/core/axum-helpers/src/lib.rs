//! # Axum Helpers
//!
//! Shared HTTP plumbing for the service binaries.
//!
//! - **[`auth`]**: JWT issuance/validation and the optional bearer middleware
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS and security header layers
//! - **[`errors`]**: `AppError` and the JSON error body
//! - **[`extractors`]**: UUID path and validated JSON extractors
//! - **[`pagination`]**: lenient `page`/`limit` parsing and slicing

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod pagination;
pub mod server;

pub use auth::{
    JwtAuth, JwtClaims, JwtConfig, TOKEN_TTL, TokenError, optional_jwt_auth_middleware,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal, with_common_layers,
};

pub use http::{cors_layer_from_env, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{QueryParams, UuidPath, ValidatedJson};

pub use pagination::{PageQuery, Pagination};
