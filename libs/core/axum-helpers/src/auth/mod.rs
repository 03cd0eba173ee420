//! Stateless JWT authentication.
//!
//! [`JwtAuth`] signs and validates tokens; [`optional_jwt_auth_middleware`]
//! attaches validated [`JwtClaims`] to requests so handlers (or GraphQL guards)
//! can decide what an anonymous caller may do.

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{ISSUER, JwtAuth, JwtClaims, TOKEN_TTL, TokenError};
pub use middleware::{extract_bearer_token, optional_jwt_auth_middleware};
