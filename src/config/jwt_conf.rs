use tracing::{debug, info, warn};

use crate::config::{ensure, required_var, var_or, ConfigError};

/// Signing secret and token lifetimes, in minutes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub jwt_secret: String,
    pub access_token_expiration: i64,
    pub refresh_token_expiration: i64,
}

impl JwtConfig {
    /// Reads `JWT_SECRET` (required, 32+ chars), `JWT_ACCESS_TOKEN_EXPIRY`
    /// (15) and `JWT_REFRESH_TOKEN_EXPIRY` (10080, one week).
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration");
        let defaults = JwtConfig::default();
        let config = JwtConfig {
            jwt_secret: required_var("JWT_SECRET")?,
            access_token_expiration: var_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiration)?,
            refresh_token_expiration: var_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiration)?,
        };
        debug!(secret_len = config.jwt_secret.len(), "JWT secret loaded");
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(self.jwt_secret.len() >= 32, "JWT secret must be at least 32 characters long")?;
        ensure(self.access_token_expiration > 0, "Access token expiration must be greater than 0")?;
        ensure(self.refresh_token_expiration > 0, "Refresh token expiration must be greater than 0")?;
        if self.access_token_expiration >= self.refresh_token_expiration {
            warn!("Access tokens outlive refresh tokens");
        }
        Ok(())
    }
}

/// Development defaults; never use the built-in secret in production.
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough_for_security_purposes".to_string(),
            access_token_expiration: 15,
            refresh_token_expiration: 10080,
        }
    }
}
