//! Readiness endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::postgres::DatabaseConnection;

async fn ready(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    let postgres: HealthCheckFuture<'_> = Box::pin(async move {
        database::postgres::check_health(&db)
            .await
            .map_err(|e| e.to_string())
    });

    run_health_checks(vec![("postgres", postgres)]).await
}

/// `GET /ready`; `/health` comes from `axum_helpers::health_router`
pub fn router(db: DatabaseConnection) -> Router {
    Router::new().route("/ready", get(ready)).with_state(db)
}
