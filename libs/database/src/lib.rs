//! Connection helpers for the stores the services persist to.
//!
//! # Features
//!
//! - `postgres` (default): SeaORM pool, startup DDL, health check
//! - `mongodb`: MongoDB client, health check
//! - `config`: `core_config::FromEnv` implementations for the configs
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config};
//!
//! let config = MongoConfig::from_env_or("product_service_db")?;
//! let client = connect_from_config(&config).await?;
//! let db = client.database(&config.database);
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
