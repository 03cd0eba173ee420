//! Readiness endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use mongodb::Database;

async fn ready(State(db): State<Database>) -> impl IntoResponse {
    let mongo: HealthCheckFuture<'_> = Box::pin(async move {
        database::mongodb::check_health(&db)
            .await
            .map_err(|e| e.to_string())
    });

    run_health_checks(vec![("mongodb", mongo)]).await
}

/// `GET /ready`; `/health` comes from `axum_helpers::health_router`
pub fn router(db: Database) -> Router {
    Router::new().route("/ready", get(ready)).with_state(db)
}
