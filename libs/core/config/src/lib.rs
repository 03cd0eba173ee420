pub mod server;
pub mod tracing;

use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },

    #[error("Invalid value for '{key}': {details}")]
    InvalidValue { key: String, details: String },
}

/// Static identity of a running service, reported by health endpoints and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl AppInfo {
    pub const fn new(name: &'static str, version: &'static str) -> Self {
        Self { name, version }
    }
}

/// Builds an [`AppInfo`] from the calling crate's Cargo metadata.
///
/// `app_info!()` uses `CARGO_PKG_NAME`; `app_info!("product-service")` overrides
/// the reported name but keeps the crate version.
#[macro_export]
macro_rules! app_info {
    () => {
        $crate::AppInfo::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    };
    ($name:expr) => {
        $crate::AppInfo::new($name, env!("CARGO_PKG_VERSION"))
    };
}

/// Deployment environment, selected by `APP_ENV`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Returns the first of `keys` that is set, or `default`.
///
/// Used where a service accepts several spellings of one setting,
/// e.g. `MONGODB_URL` and `MONGO_URL`.
pub fn env_first_or_default(keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|key| env::var(key).ok())
        .unwrap_or_else(|| default.to_string())
}

/// Parses an optional numeric/boolean variable, falling back to `default` when unset.
pub fn env_parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        for value in ["production", "PRODUCTION", "Production"] {
            temp_env::with_var("APP_ENV", Some(value), || {
                assert_eq!(Environment::from_env(), Environment::Production);
            });
        }
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_app_info_macro_uses_crate_metadata() {
        let info = app_info!();
        assert_eq!(info.name, "core_config");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));

        let named = app_info!("product-service");
        assert_eq!(named.name, "product-service");
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("CFG_TEST_VAR", Some("value"), || {
            assert_eq!(env_or_default("CFG_TEST_VAR", "default"), "value");
        });
        temp_env::with_var_unset("CFG_TEST_VAR", || {
            assert_eq!(env_or_default("CFG_TEST_VAR", "default"), "default");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("CFG_MISSING_REQUIRED", || {
            let err = env_required("CFG_MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("CFG_MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_first_or_default_prefers_first_set_key() {
        temp_env::with_vars(
            [("CFG_PRIMARY", None::<&str>), ("CFG_FALLBACK", Some("fallback"))],
            || {
                assert_eq!(
                    env_first_or_default(&["CFG_PRIMARY", "CFG_FALLBACK"], "default"),
                    "fallback"
                );
            },
        );
        temp_env::with_vars(
            [("CFG_PRIMARY", Some("primary")), ("CFG_FALLBACK", Some("fallback"))],
            || {
                assert_eq!(
                    env_first_or_default(&["CFG_PRIMARY", "CFG_FALLBACK"], "default"),
                    "primary"
                );
            },
        );
    }

    #[test]
    fn test_env_parse_or() {
        temp_env::with_var_unset("CFG_POOL", || {
            assert_eq!(env_parse_or("CFG_POOL", 10u32).unwrap(), 10);
        });
        temp_env::with_var("CFG_POOL", Some("25"), || {
            assert_eq!(env_parse_or("CFG_POOL", 10u32).unwrap(), 25);
        });
        temp_env::with_var("CFG_POOL", Some("lots"), || {
            let err = env_parse_or("CFG_POOL", 10u32).unwrap_err();
            assert!(err.to_string().contains("CFG_POOL"));
        });
    }
}
