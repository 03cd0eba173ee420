use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement,
};
use tracing::{info, instrument};

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult};

/// Opens the pool described by `config`. No retry on failure.
#[instrument(skip(config))]
pub async fn connect_from_config(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.into_connect_options()).await?;
    info!("connected to PostgreSQL");
    Ok(db)
}

/// Runs idempotent DDL (`CREATE ... IF NOT EXISTS`) statements in order.
///
/// Services call this at startup to make sure their tables exist; there is
/// no version tracking and no down migration.
/// A failing statement aborts the run; earlier statements stay applied.
pub async fn ensure_schema(db: &DatabaseConnection, statements: &[&str]) -> DatabaseResult<()> {
    for (index, sql) in statements.iter().enumerate() {
        db.execute_raw(Statement::from_string(DatabaseBackend::Postgres, *sql))
            .await
            .map_err(|source| DatabaseError::Schema { index, source })?;
    }
    info!(statements = statements.len(), "schema ensured");
    Ok(())
}
