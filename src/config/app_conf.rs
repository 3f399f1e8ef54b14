use tracing::debug;

use crate::config::{ensure, var_or, ConfigError};

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Origin of the single-page client; any origin is allowed when unset.
    pub cors_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            host: var_or("APP_HOST", defaults.host)?,
            port: var_or("APP_PORT", defaults.port)?,
            cors_origin: std::env::var("CORS_ORIGIN").ok().filter(|s| !s.trim().is_empty()),
        };
        debug!(host = %config.host, port = config.port, cors_origin = ?config.cors_origin, "App configuration loaded");
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(!self.host.trim().is_empty(), "APP_HOST cannot be empty")?;
        ensure(self.port > 0, "APP_PORT must be greater than 0")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        assert_eq!(AppConfig::default().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_zero_port_rejected() {
        let config = AppConfig { port: 0, ..AppConfig::default() };
        assert!(config.validate().is_err());
    }
}
