use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::activity::Activity;
use crate::model::client::Client;
use crate::model::quote::Quote;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    #[validate(length(equal = 24))]
    pub client_id: String,

    #[validate(length(min = 1, max = 500))]
    pub product: String,

    pub platform: Option<String>,

    /// Defaults to `quote`
    pub status: Option<String>,

    #[validate(range(min = 0.0))]
    pub cost: f64,

    /// Takes precedence over `markup_percent`; with neither the cost is charged as is.
    #[validate(range(min = 0.0))]
    pub charged_amount: Option<f64>,

    #[validate(range(min = -100.0))]
    pub markup_percent: Option<f64>,

    #[validate(range(min = 0.0))]
    pub amount_paid: Option<f64>,

    pub payment_method: Option<String>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Partial update, absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuoteRequest {
    #[validate(length(equal = 24))]
    pub client_id: Option<String>,

    #[validate(length(min = 1, max = 500))]
    pub product: Option<String>,

    pub platform: Option<String>,
    pub status: Option<String>,

    #[validate(range(min = 0.0))]
    pub cost: Option<f64>,

    #[validate(range(min = 0.0))]
    pub charged_amount: Option<f64>,

    #[validate(range(min = -100.0))]
    pub markup_percent: Option<f64>,

    #[validate(range(min = 0.0))]
    pub amount_paid: Option<f64>,

    pub payment_method: Option<String>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteListQuery {
    pub status: Option<String>,
    pub client_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissingQuotesQuery {
    pub status: Option<String>,
}

/// List entry with the client's display name resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteView {
    #[serde(flatten)]
    pub quote: Quote,
    pub client_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub client: Option<Client>,
    pub activities: Vec<Activity>,
}
