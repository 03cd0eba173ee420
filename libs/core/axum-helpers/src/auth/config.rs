use core_config::{ConfigError, FromEnv, env_required};

const MIN_SECRET_LEN: usize = 32;

/// HMAC signing secret for issued tokens, loaded from `JWT_SECRET`.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig").field("secret", &"<redacted>").finish()
    }
}

impl JwtConfig {
    /// Fails when the secret is shorter than 32 bytes.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least {MIN_SECRET_LEN} characters (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }
        Ok(Self { secret })
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::new(env_required("JWT_SECRET")?)
    }
}
