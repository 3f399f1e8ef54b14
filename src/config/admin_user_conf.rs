use crate::config::{required_var, ConfigError};

/// Account seeded as administrator on first start. All five variables must
/// be present for the seed to run.
#[derive(Debug, Clone)]
pub struct AdminUserConfig {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl AdminUserConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AdminUserConfig {
            username: required_var("ADMIN_USERNAME")?,
            first_name: required_var("ADMIN_FIRST_NAME")?,
            last_name: required_var("ADMIN_LAST_NAME")?,
            email: required_var("ADMIN_EMAIL")?.trim().to_lowercase(),
            password: required_var("ADMIN_PASSWORD")?,
        })
    }
}
