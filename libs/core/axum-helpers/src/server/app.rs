use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::{cors_layer_from_env, security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Wraps a fully routed service with the layers every binary shares:
/// a JSON 404 fallback, request tracing, security headers, CORS and compression.
///
/// Fails when `CORS_ALLOWED_ORIGIN` is missing or malformed.
pub fn with_common_layers(router: Router) -> io::Result<Router> {
    let cors = cors_layer_from_env()?;

    Ok(router
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors)
        .layer(CompressionLayer::new()))
}

/// REST router: OpenAPI viewers plus `apis` nested under `/api`.
///
/// Serves the OpenAPI document at `/api-docs/openapi.json` and the Swagger UI, Redoc,
/// RapiDoc and Scalar viewers. Routers passed in must already carry their state.
///
/// ```ignore
/// let api = Router::new().nest("/v1/products", products::router(&state));
/// let router = create_router::<ApiDoc>(api)?;   // -> /api/v1/products
/// ```
pub fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis);

    with_common_layers(router)
}

/// Serves `router` until SIGINT/SIGTERM, then runs `cleanup` bounded by `shutdown_timeout`.
///
/// ```ignore
/// create_production_app(app, &config.server, Duration::from_secs(30), async move {
///     drop(mongo_client);
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, _rx) = ShutdownCoordinator::new();
    let cleanup_signal = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        cleanup_signal.wait_for_signal().await;

        info!(?shutdown_timeout, "running cleanup tasks");
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("cleanup completed"),
            Err(_) => tracing::warn!(?shutdown_timeout, "cleanup timed out, forcing shutdown"),
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { coordinator.wait_for_signal().await })
        .await
        .inspect_err(|e| tracing::error!(error = ?e, "server error"));

    cleanup_handle.await.ok();

    serve_result
}
