use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ensure, required_var, var_or, ConfigError};

/// Connection settings for the MongoDB deployment. Multi-document writes run
/// in transactions, so the URI must point at a replica set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub pool_size: u32,
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Reads `MONGO_URI` and `MONGO_DATABASE` (required), optional
    /// `MONGO_USERNAME`/`MONGO_PASSWORD`, `MONGO_POOL_SIZE` (10) and
    /// `MONGO_CONNECTION_TIMEOUT` in seconds (5).
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration");
        let defaults = MongoConfig::default();
        let config = MongoConfig {
            uri: required_var("MONGO_URI")?,
            database: required_var("MONGO_DATABASE")?,
            username: std::env::var("MONGO_USERNAME").ok(),
            password: std::env::var("MONGO_PASSWORD").ok(),
            pool_size: var_or("MONGO_POOL_SIZE", defaults.pool_size)?,
            connection_timeout_secs: var_or("MONGO_CONNECTION_TIMEOUT", defaults.connection_timeout_secs)?,
        };
        debug!(
            database = %config.database,
            username = ?config.username,
            pool_size = config.pool_size,
            "MongoDB configuration read"
        );
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(!self.uri.trim().is_empty(), "MongoDB URI cannot be empty")?;
        ensure(!self.database.trim().is_empty(), "MongoDB database cannot be empty")?;
        ensure(self.pool_size > 0, "MongoDB pool size must be greater than 0")?;
        ensure(self.connection_timeout_secs > 0, "MongoDB connection timeout must be greater than 0")?;
        match (self.username.as_deref(), self.password.as_deref()) {
            (None, None) => Ok(()),
            (Some(user), Some(pass)) => ensure(
                !user.is_empty() && !pass.is_empty(),
                "MongoDB credentials cannot be empty when set",
            ),
            _ => ensure(false, "MongoDB username and password must be set together"),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017/?replicaSet=rs0".to_string(),
            database: "shipdesk".to_string(),
            username: None,
            password: None,
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}
