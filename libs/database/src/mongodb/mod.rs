//! MongoDB connection setup and health checks.

mod config;
mod connector;
mod health;

pub use config::{DEFAULT_MONGODB_URL, MongoConfig};
pub use connector::{connect, connect_from_config};
pub use health::check_health;

pub use mongodb::{Client, Collection, Database};
