//! GraphQL schema and HTTP routes for the auth service.
//!
//! Guarded fields need [`JwtClaims`] in the request data. The `/query`
//! handler copies them from the request extensions, where
//! `optional_jwt_auth_middleware` puts them after validating a bearer token.

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, Guard, Object, Result, Schema,
    http::{GraphQLPlaygroundConfig, playground_source},
};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Extension, Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
};
use axum_helpers::{JwtAuth, JwtClaims, optional_jwt_auth_middleware};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{CreateUser, LoginResult, Role, UpdateUser, User};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Service type stored in the schema data; the store is chosen at startup.
pub type SharedUserService = UserService<Arc<dyn UserRepository>>;

pub type UserSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub const ACCESS_DENIED: &str = "Access Denied";

/// Rejects the field unless the request carries validated claims.
pub struct AuthGuard;

impl Guard for AuthGuard {
    async fn check(&self, ctx: &Context<'_>) -> Result<()> {
        if ctx.data_opt::<JwtClaims>().is_some() {
            Ok(())
        } else {
            Err(ACCESS_DENIED.into())
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// User by id, or null
    async fn user(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<User>> {
        let service = ctx.data::<SharedUserService>()?;
        service.user(id).await.map_err(|e| e.extend())
    }

    /// User by email, or null
    async fn user_by_email(&self, ctx: &Context<'_>, email: String) -> Result<Option<User>> {
        let service = ctx.data::<SharedUserService>()?;
        service.user_by_email(&email).await.map_err(|e| e.extend())
    }

    #[graphql(guard = "AuthGuard")]
    async fn users_by_role(&self, ctx: &Context<'_>, role: Role) -> Result<Vec<User>> {
        let service = ctx.data::<SharedUserService>()?;
        service.users_by_role(role).await.map_err(|e| e.extend())
    }

    /// The caller, identified by the bearer token
    #[graphql(guard = "AuthGuard")]
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let service = ctx.data::<SharedUserService>()?;
        let claims = ctx.data::<JwtClaims>()?;
        service.me(claims).await.map_err(|e| e.extend())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_user(&self, ctx: &Context<'_>, input: CreateUser) -> Result<User> {
        let service = ctx.data::<SharedUserService>()?;
        service.create_user(input).await.map_err(|e| e.extend())
    }

    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> Result<LoginResult> {
        let service = ctx.data::<SharedUserService>()?;
        service.login(&email, &password).await.map_err(|e| e.extend())
    }

    #[graphql(guard = "AuthGuard")]
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        email: String,
        input: UpdateUser,
    ) -> Result<User> {
        let service = ctx.data::<SharedUserService>()?;
        service.update_user(&email, input).await.map_err(|e| e.extend())
    }

    /// True when a user was removed
    #[graphql(guard = "AuthGuard")]
    async fn delete_user(&self, ctx: &Context<'_>, email: String) -> Result<bool> {
        let service = ctx.data::<SharedUserService>()?;
        service.delete_user(&email).await.map_err(|e| e.extend())
    }
}

pub fn build_schema(service: SharedUserService) -> UserSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .finish()
}

/// `GET /` and `GET /query` serve the playground; `POST /query` executes.
pub fn router(schema: UserSchema, jwt: JwtAuth) -> Router {
    Router::new()
        .route("/", get(playground))
        .route("/query", get(playground).post(graphql_handler))
        .layer(axum::middleware::from_fn_with_state(
            jwt,
            optional_jwt_auth_middleware,
        ))
        .with_state(schema)
}

async fn graphql_handler(
    State(schema): State<UserSchema>,
    claims: Option<Extension<JwtClaims>>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(Extension(claims)) = claims {
        request = request.data(claims);
    }
    schema.execute(request).await.into()
}

async fn playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/query")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;
    use axum_helpers::JwtConfig;

    fn schema() -> UserSchema {
        let jwt = JwtAuth::new(&JwtConfig::new("graphql-test-secret-at-least-32-chars").unwrap());
        let repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        build_schema(UserService::new(repository, jwt))
    }

    #[tokio::test]
    async fn test_guarded_query_without_claims_is_denied() {
        let response = schema().execute("{ me { id } }").await;
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].message, ACCESS_DENIED);
    }

    #[tokio::test]
    async fn test_unguarded_lookup_returns_null_for_unknown_email() {
        let response = schema()
            .execute(r#"{ userByEmail(email: "ghost@example.com") { id } }"#)
            .await;
        assert!(response.errors.is_empty());
        assert_eq!(
            response.data.into_json().unwrap(),
            serde_json::json!({ "userByEmail": null })
        );
    }

    #[tokio::test]
    async fn test_schema_hides_password_hash() {
        let sdl = schema().sdl();
        assert!(sdl.contains("firstName"));
        assert!(!sdl.contains("passwordHash"));
    }
}
