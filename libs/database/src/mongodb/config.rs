#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_first_or_default, env_parse_or};

pub const DEFAULT_MONGODB_URL: &str = "mongodb://localhost:27017";

/// MongoDB connection settings.
///
/// ```ignore
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "product_service_db")
///     .with_app_name("product-service");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MongoConfig {
    /// `mongodb://[username:password@]host[:port][/database][?options]`
    pub url: String,
    pub database: String,
    /// Reported to the server in connection handshakes
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    pub fn with_database(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_pool_size(mut self, max_pool_size: u32, min_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self.min_pool_size = min_pool_size;
        self
    }

    /// Loads from the environment, using `default_database` when no database
    /// variable is set.
    ///
    /// - `MONGODB_URL` | `MONGO_URL` | `URI` (default `mongodb://localhost:27017`)
    /// - `MONGODB_DATABASE` | `MONGO_DATABASE` | `DATABASE_NAME`
    /// - `MONGODB_APP_NAME`
    /// - `MONGODB_MAX_POOL_SIZE` (100), `MONGODB_MIN_POOL_SIZE` (5)
    /// - `MONGODB_CONNECT_TIMEOUT_SECS` (10), `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (30)
    #[cfg(feature = "config")]
    pub fn from_env_or(default_database: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            url: env_first_or_default(&["MONGODB_URL", "MONGO_URL", "URI"], DEFAULT_MONGODB_URL),
            database: env_first_or_default(
                &["MONGODB_DATABASE", "MONGO_DATABASE", "DATABASE_NAME"],
                default_database,
            ),
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
            max_pool_size: env_parse_or("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            min_pool_size: env_parse_or("MONGODB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            connect_timeout_secs: env_parse_or(
                "MONGODB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            server_selection_timeout_secs: env_parse_or(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                defaults.server_selection_timeout_secs,
            )?,
        })
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MONGODB_URL.to_string(),
            database: "default".to_string(),
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }
}

#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_or("default")
    }
}
