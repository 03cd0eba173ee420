use mongodb::{Database, bson::doc};
use tracing::debug;

use crate::common::DatabaseError;

/// Pings the database the service works against. Used by `/ready`.
pub async fn check_health(db: &Database) -> Result<(), DatabaseError> {
    debug!("running MongoDB health check");
    db.run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("MongoDB ping failed: {e}")))
}
