//! Product service - REST API for the product catalog and category tree

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(database = %config.mongodb.database, "Connecting to MongoDB");

    let mongo_client = database::mongodb::connect_from_config(&config.mongodb).await?;
    let db = mongo_client.database(&config.mongodb.database);

    let state = AppState {
        config: config.clone(),
        mongo_client,
        db,
    };

    api::init_indexes(&state).await?;

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state))?;
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.db.clone()));

    info!(
        port = state.config.server.port,
        "Starting {} v{}", state.config.app.name, state.config.app.version
    );

    let mongo_client = state.mongo_client.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            mongo_client.shutdown().await;
            info!("MongoDB connection closed");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Product service shutdown complete");
    Ok(())
}
