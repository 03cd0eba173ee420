//! Configuration for the product service

use core_config::{app_info, server::ServerConfig, AppInfo, FromEnv};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Database used when neither `MONGODB_DATABASE` nor `MONGO_DATABASE` is set
pub const DEFAULT_DATABASE: &str = "product_service_db";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let app = app_info!("product-service");
        let mongodb = MongoConfig::from_env_or(DEFAULT_DATABASE)?;

        Ok(Self {
            mongodb: if mongodb.app_name.is_none() {
                mongodb.with_app_name(app.name)
            } else {
                mongodb
            },
            server: ServerConfig::from_env()?,
            environment: Environment::from_env(),
            app,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", None),
                ("URI", None),
                ("MONGODB_DATABASE", None),
                ("MONGO_DATABASE", None),
                ("DATABASE_NAME", None),
                ("MONGODB_APP_NAME", None),
                ("PORT", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.mongodb.url, "mongodb://localhost:27017");
                assert_eq!(config.mongodb.database, DEFAULT_DATABASE);
                assert_eq!(config.mongodb.app_name.as_deref(), Some("product-service"));
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.app.name, "product-service");
            },
        );
    }

    #[test]
    fn test_mongo_alias_variables() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", Some("mongodb://mongo:27017")),
                ("MONGODB_DATABASE", None),
                ("MONGO_DATABASE", Some("catalog")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.mongodb.url, "mongodb://mongo:27017");
                assert_eq!(config.mongodb.database, "catalog");
            },
        );
    }
}
