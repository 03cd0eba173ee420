//! Auth service - GraphQL API for accounts, login and token-guarded lookups

use axum_helpers::server::{create_production_app, health_router, with_common_layers};
use axum_helpers::JwtAuth;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{connect_from_config, ensure_schema};
use domain_users::{graphql, PostgresUserRepository, UserRepository, UserService, USERS_SCHEMA};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod config;
mod health;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to PostgreSQL");
    let db = connect_from_config(config.postgres.clone()).await?;
    ensure_schema(&db, USERS_SCHEMA).await?;

    let jwt = JwtAuth::new(&config.jwt);
    let repository: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(db.clone()));
    let schema = graphql::build_schema(UserService::new(repository, jwt.clone()));

    let app = with_common_layers(
        graphql::router(schema, jwt)
            .merge(health_router(config.app))
            .merge(health::router(db.clone())),
    )?;

    info!(
        port = config.server.port,
        "Starting {} v{}, GraphQL playground at /", config.app.name, config.app.version
    );

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: closing PostgreSQL pool");
        if let Err(e) = db.close().await {
            tracing::warn!(error = %e, "error while closing PostgreSQL pool");
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Auth service shutdown complete");
    Ok(())
}
