use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{info, instrument};

use crate::dto::settings_dto::UpdateSettingsRequest;
use crate::model::settings::Settings;
use crate::repository::settings_repo::SettingsRepository;
use crate::service::non_empty;
use crate::util::error::ServiceError;
use crate::util::period::now_timestamp;

#[async_trait]
pub trait SettingsService: Send + Sync {
    async fn get_settings(&self) -> Result<Settings, ServiceError>;
    async fn update_settings(&self, request: UpdateSettingsRequest) -> Result<Settings, ServiceError>;
}

pub struct SettingsServiceImpl {
    pub settings_repo: Arc<dyn SettingsRepository>,
}

impl SettingsServiceImpl {
    pub fn new(settings_repo: Arc<dyn SettingsRepository>) -> Self {
        Self { settings_repo }
    }
}

fn clean_options(options: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(options.len());
    for option in options {
        let option = option.trim().to_string();
        if !option.is_empty() && !cleaned.contains(&option) {
            cleaned.push(option);
        }
    }
    cleaned
}

#[async_trait]
impl SettingsService for SettingsServiceImpl {
    #[instrument(skip(self))]
    async fn get_settings(&self) -> Result<Settings, ServiceError> {
        Ok(self.settings_repo.get_or_create().await?)
    }

    #[instrument(skip(self, request))]
    async fn update_settings(&self, request: UpdateSettingsRequest) -> Result<Settings, ServiceError> {
        let mut settings = self.settings_repo.get_or_create().await?;
        if settings.id.is_none() {
            settings.id = Some(ObjectId::new());
        }
        if let Some(name) = non_empty(request.company_name) {
            settings.company_name = name;
        }
        if request.company_email.is_some() {
            settings.company_email = non_empty(request.company_email);
        }
        if request.company_phone.is_some() {
            settings.company_phone = non_empty(request.company_phone);
        }
        if request.company_address.is_some() {
            settings.company_address = non_empty(request.company_address);
        }
        if let Some(tax_rate) = request.tax_rate {
            settings.tax_rate = tax_rate;
        }
        if let Some(currency) = non_empty(request.currency) {
            settings.currency = currency.to_uppercase();
        }
        if let Some(options) = request.platform_options {
            settings.platform_options = clean_options(options);
        }
        if let Some(options) = request.payment_options {
            settings.payment_options = clean_options(options);
        }
        settings.updated_at = Some(now_timestamp());
        let saved = self.settings_repo.save(settings).await?;
        info!("Settings updated");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_options_trims_and_dedups() {
        let cleaned = clean_options(vec![" Amazon".into(), "".into(), "Amazon".into(), "eBay ".into()]);
        assert_eq!(cleaned, vec!["Amazon".to_string(), "eBay".to_string()]);
    }
}
