#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    #[cfg(feature = "postgres")]
    #[error("schema statement {index} failed: {source}")]
    Schema {
        index: usize,
        #[source]
        source: sea_orm::DbErr,
    },

    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("could not connect: {0}")]
    ConnectionFailed(String),

    #[error("not ready: {0}")]
    HealthCheckFailed(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
