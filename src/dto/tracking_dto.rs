use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::client::Client;
use crate::model::quote::Quote;
use crate::model::tracking::Tracking;

/// Body of tracking create and update. On update `quote_ids` is the complete new set.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    #[validate(length(min = 1, max = 100))]
    pub tracking_number: String,

    #[validate(length(equal = 24))]
    pub client_id: String,

    #[validate(length(min = 1))]
    pub quote_ids: Vec<String>,

    #[validate(range(min = 0.0))]
    pub declared_value: f64,

    #[validate(range(min = 0.0))]
    pub shipping_cost: f64,

    pub status: Option<String>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchShipmentRequest {
    #[validate(length(min = 1, max = 100))]
    pub tracking_number: String,

    #[validate(length(equal = 24))]
    pub client_id: String,

    #[validate(length(min = 1))]
    pub quote_ids: Vec<String>,

    /// Defaults to the sum of the selected quotes' charged amounts.
    #[validate(range(min = 0.0))]
    pub declared_value: Option<f64>,

    #[validate(range(min = 0.0))]
    pub shipping_cost: f64,

    pub status: Option<String>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrackingStatusRequest {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackingPaymentRequest {
    #[validate(range(min = 0.0))]
    pub amount_paid: f64,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingListQuery {
    pub status: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleQuotesQuery {
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingDetail {
    #[serde(flatten)]
    pub tracking: Tracking,
    pub client: Option<Client>,
    pub quotes: Vec<Quote>,
}
