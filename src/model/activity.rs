use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::quote::{Quote, QuoteStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Pending,
    Completed,
}

/// Append-only audit entry written alongside quote creation and status changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "_id", serialize_with = "crate::util::object_id::hex_opt")]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "crate::util::object_id::hex")]
    pub quote_id: ObjectId,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub amount: f64,
    pub status: ActivityStatus,
    pub created_at: Option<String>,
}

impl Activity {
    fn for_quote(quote: &Quote, quote_id: ObjectId, activity_type: String, now: &str) -> Self {
        let status = if quote.status == QuoteStatus::Paid {
            ActivityStatus::Completed
        } else {
            ActivityStatus::Pending
        };
        Activity {
            id: Some(ObjectId::new()),
            quote_id,
            activity_type,
            amount: quote.charged_amount,
            status,
            created_at: Some(now.to_string()),
        }
    }

    /// "New Order" when the quote starts out purchased, "New Quote" otherwise.
    pub fn quote_created(quote: &Quote, quote_id: ObjectId, now: &str) -> Self {
        let label = if quote.status == QuoteStatus::Purchased { "New Order" } else { "New Quote" };
        Self::for_quote(quote, quote_id, label.to_string(), now)
    }

    pub fn status_changed(quote: &Quote, quote_id: ObjectId, now: &str) -> Self {
        let label = match quote.status {
            QuoteStatus::Paid => "Payment Received".to_string(),
            other => format!("Status changed to {}", other),
        };
        Self::for_quote(quote, quote_id, label, now)
    }
}
