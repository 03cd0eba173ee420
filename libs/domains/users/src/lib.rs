//! Users Domain
//!
//! Accounts, password login and the GraphQL API served by the auth service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   GraphQL   │  ← Query/Mutation resolvers, AuthGuard
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, argon2 hashing, token issuance
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Trait + in-memory and PostgreSQL implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, Role, inputs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{graphql, InMemoryUserRepository, UserRepository, UserService};
//!
//! let jwt = JwtAuth::new(&JwtConfig::new("a-secret-that-is-at-least-32-chars").unwrap());
//! let repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
//! let schema = graphql::build_schema(UserService::new(repository, jwt.clone()));
//! let router = graphql::router(schema, jwt);
//! ```

pub mod error;
pub mod graphql;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use graphql::{SharedUserService, UserSchema, build_schema};
pub use models::{CreateUser, LoginResult, Role, UpdateUser, User};
pub use postgres::{PostgresUserRepository, USERS_SCHEMA};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
