use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Process-wide singleton holding the company profile and dropdown options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(rename = "_id", serialize_with = "crate::util::object_id::hex_opt")]
    pub id: Option<ObjectId>,
    pub company_name: String,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub tax_rate: f64,
    pub currency: String,
    pub platform_options: Vec<String>,
    pub payment_options: Vec<String>,
    pub updated_at: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            id: None,
            company_name: "My Company".to_string(),
            company_email: None,
            company_phone: None,
            company_address: None,
            tax_rate: 0.0,
            currency: "USD".to_string(),
            platform_options: ["Amazon", "eBay", "Walmart", "AliExpress", "Other"]
                .into_iter()
                .map(String::from)
                .collect(),
            payment_options: ["Cash", "Credit Card", "Bank Transfer", "PayPal", "Zelle"]
                .into_iter()
                .map(String::from)
                .collect(),
            updated_at: None,
        }
    }
}
