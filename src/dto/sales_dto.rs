use std::collections::BTreeMap;

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::quote::Quote;
use crate::model::tracking::Tracking;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleKind {
    Quote,
    Tracking,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesQuery {
    /// `YYYY-MM`, current month when absent
    pub month: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// A quote, or a tracking shown as a synthetic order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    #[serde(rename = "_id", serialize_with = "crate::util::object_id::hex")]
    pub id: ObjectId,
    pub kind: SaleKind,
    #[serde(serialize_with = "crate::util::object_id::hex")]
    pub client_id: ObjectId,
    pub client_name: Option<String>,
    pub product: String,
    pub platform: Option<String>,
    pub status: String,
    pub cost: f64,
    pub charged_amount: f64,
    pub amount_paid: f64,
    pub payment_method: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub month: String,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub profit: f64,
    pub total_orders: u64,
    pub total_paid: f64,
    pub status_breakdown: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidOrder {
    #[serde(rename = "_id", serialize_with = "crate::util::object_id::hex")]
    pub id: ObjectId,
    pub kind: SaleKind,
    #[serde(serialize_with = "crate::util::object_id::hex")]
    pub client_id: ObjectId,
    pub client_name: Option<String>,
    pub description: String,
    pub status: String,
    pub total_amount: f64,
    pub amount_paid: f64,
    pub remaining_amount: f64,
    pub days_overdue: i64,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleRequest {
    #[validate(range(min = 0.0))]
    pub amount_paid: f64,
    pub payment_method: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum UpdatedSale {
    Quote(Quote),
    Tracking(Tracking),
}
