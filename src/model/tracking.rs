use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shipment lifecycle. Deliberately separate from the quote vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    #[default]
    Pending,
    InTransit,
    Delivered,
    Paid,
}

impl TrackingStatus {
    pub const ALL: [TrackingStatus; 4] = [
        TrackingStatus::Pending,
        TrackingStatus::InTransit,
        TrackingStatus::Delivered,
        TrackingStatus::Paid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::Pending => "pending",
            TrackingStatus::InTransit => "in_transit",
            TrackingStatus::Delivered => "delivered",
            TrackingStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown tracking status: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    #[serde(rename = "_id", serialize_with = "crate::util::object_id::hex_opt")]
    pub id: Option<ObjectId>,
    pub tracking_number: String,
    #[serde(serialize_with = "crate::util::object_id::hex")]
    pub client_id: ObjectId,
    pub declared_value: f64,
    pub shipping_cost: f64,
    /// declaredValue + shippingCost, stored
    pub total_value: f64,
    pub amount_paid: f64,
    pub status: TrackingStatus,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Tracking {
    /// Sets both value components and recomputes the stored total.
    pub fn set_values(&mut self, declared_value: f64, shipping_cost: f64) {
        self.declared_value = declared_value;
        self.shipping_cost = shipping_cost;
        self.total_value = declared_value + shipping_cost;
        self.amount_paid = self.amount_paid.min(self.total_value);
        if self.status == TrackingStatus::Paid {
            self.amount_paid = self.total_value;
        }
    }

    /// Entering `paid` settles the shipment in full.
    pub fn apply_status(&mut self, status: TrackingStatus) {
        self.status = status;
        if status == TrackingStatus::Paid {
            self.amount_paid = self.total_value;
        }
    }

    /// Records a payment. Without an explicit status the shipment becomes
    /// `paid` once the amount covers the total. The stored amount never
    /// exceeds the total; overpayment is dropped.
    pub fn apply_payment(&mut self, amount_paid: f64, status: Option<TrackingStatus>) {
        let status = match status {
            Some(status) => status,
            None if amount_paid >= self.total_value => TrackingStatus::Paid,
            None => self.status,
        };
        self.amount_paid = amount_paid.min(self.total_value);
        self.apply_status(status);
    }

    pub fn remaining_amount(&self) -> f64 {
        self.total_value - self.amount_paid
    }
}
