use serde::{Deserialize, Serialize};
use validator::Validate;

/// Partial update of the settings singleton.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,

    #[validate(email)]
    pub company_email: Option<String>,

    pub company_phone: Option<String>,
    pub company_address: Option<String>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub tax_rate: Option<f64>,

    #[validate(length(equal = 3))]
    pub currency: Option<String>,

    pub platform_options: Option<Vec<String>>,
    pub payment_options: Option<Vec<String>>,
}
