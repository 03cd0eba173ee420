use mongodb::{Client, bson::doc, options::ClientOptions};
use std::time::Duration;
use tracing::{info, instrument};

use super::MongoConfig;
use crate::common::DatabaseError;

/// Builds a client from `config` and pings the server once.
///
/// There is no retry: a server that is unreachable at startup fails the call.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, DatabaseError> {
    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));
    options.app_name = config.app_name.clone();

    let client = Client::with_options(options)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("connected to MongoDB");
    Ok(client)
}

/// Shorthand for [`connect_from_config`] with default pool settings.
pub async fn connect(url: &str) -> Result<Client, DatabaseError> {
    connect_from_config(&MongoConfig {
        url: url.to_string(),
        ..MongoConfig::default()
    })
    .await
}
