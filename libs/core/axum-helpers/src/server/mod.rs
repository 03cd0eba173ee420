//! Router assembly, health endpoints and graceful shutdown.
//!
//! ```ignore
//! let router = create_router::<ApiDoc>(api_routes)?
//!     .merge(health_router(app_info!("product-service")));
//! create_production_app(router, &config.server, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router, with_common_layers};
pub use health::{HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
