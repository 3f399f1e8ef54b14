use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sales-and-fulfilment vocabulary of a quote, in pipeline order. The order
/// is a convention only: any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Quote,
    Quoted,
    Purchase,
    Purchased,
    Received,
    ReadyToShip,
    Held,
    Shipped,
    Paid,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 9] = [
        QuoteStatus::Quote,
        QuoteStatus::Quoted,
        QuoteStatus::Purchase,
        QuoteStatus::Purchased,
        QuoteStatus::Received,
        QuoteStatus::ReadyToShip,
        QuoteStatus::Held,
        QuoteStatus::Shipped,
        QuoteStatus::Paid,
    ];

    /// Quotes still waiting for a price.
    pub const MISSING_QUOTE: [QuoteStatus; 2] = [QuoteStatus::Quote, QuoteStatus::Quoted];

    /// Statuses counted toward revenue and profit.
    pub const REVENUE: [QuoteStatus; 4] = [
        QuoteStatus::Purchase,
        QuoteStatus::Purchased,
        QuoteStatus::Received,
        QuoteStatus::Paid,
    ];

    /// Statuses a quote may have when it is grouped into a shipment.
    pub const SHIPMENT_ELIGIBLE: [QuoteStatus; 4] = [
        QuoteStatus::Purchased,
        QuoteStatus::Received,
        QuoteStatus::ReadyToShip,
        QuoteStatus::Held,
    ];

    /// Buckets reported by the status distribution chart.
    pub const DISTRIBUTION: [QuoteStatus; 6] = [
        QuoteStatus::Quote,
        QuoteStatus::Quoted,
        QuoteStatus::Purchase,
        QuoteStatus::Purchased,
        QuoteStatus::Received,
        QuoteStatus::Paid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Quote => "quote",
            QuoteStatus::Quoted => "quoted",
            QuoteStatus::Purchase => "purchase",
            QuoteStatus::Purchased => "purchased",
            QuoteStatus::Received => "received",
            QuoteStatus::ReadyToShip => "ready_to_ship",
            QuoteStatus::Held => "held",
            QuoteStatus::Shipped => "shipped",
            QuoteStatus::Paid => "paid",
        }
    }

    pub fn is_missing_quote(&self) -> bool {
        Self::MISSING_QUOTE.contains(self)
    }

    pub fn is_revenue_eligible(&self) -> bool {
        Self::REVENUE.contains(self)
    }

    pub fn is_shipment_eligible(&self) -> bool {
        Self::SHIPMENT_ELIGIBLE.contains(self)
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown quote status: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(rename = "_id", serialize_with = "crate::util::object_id::hex_opt")]
    pub id: Option<ObjectId>,
    #[serde(serialize_with = "crate::util::object_id::hex")]
    pub client_id: ObjectId,
    pub product: String,
    pub platform: Option<String>,
    pub status: QuoteStatus,
    pub cost: f64,
    pub charged_amount: f64,
    pub amount_paid: f64,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    /// Shipment grouping this quote, if any
    #[serde(serialize_with = "crate::util::object_id::hex_opt")]
    pub tracking_id: Option<ObjectId>,
    /// Last time the quote moved into `paid`
    pub paid_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Quote {
    /// Moves the quote to `status`. Entering `paid` settles the quote in
    /// full. Returns whether the status actually changed.
    pub fn apply_status(&mut self, status: QuoteStatus, now: &str) -> bool {
        let changed = self.status != status;
        self.status = status;
        if status == QuoteStatus::Paid {
            self.amount_paid = self.charged_amount;
            if changed || self.paid_at.is_none() {
                self.paid_at = Some(now.to_string());
            }
        }
        changed
    }

    pub fn remaining_amount(&self) -> f64 {
        self.charged_amount - self.amount_paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(status: QuoteStatus) -> Quote {
        Quote {
            id: Some(ObjectId::new()),
            client_id: ObjectId::new(),
            product: "Espresso machine".to_string(),
            platform: Some("Amazon".to_string()),
            status,
            cost: 1000.0,
            charged_amount: 1300.0,
            amount_paid: 200.0,
            payment_method: None,
            notes: None,
            tracking_id: None,
            paid_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in QuoteStatus::ALL {
            assert_eq!(status.as_str().parse::<QuoteStatus>(), Ok(status));
        }
        assert!("shipment".parse::<QuoteStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&QuoteStatus::ReadyToShip).unwrap(),
            "\"ready_to_ship\""
        );
    }

    #[test]
    fn test_status_subsets() {
        assert!(QuoteStatus::Quoted.is_missing_quote());
        assert!(!QuoteStatus::Purchase.is_missing_quote());
        assert!(QuoteStatus::Paid.is_revenue_eligible());
        assert!(!QuoteStatus::Quote.is_revenue_eligible());
        assert!(!QuoteStatus::Shipped.is_revenue_eligible());
        assert!(QuoteStatus::Held.is_shipment_eligible());
        assert!(!QuoteStatus::Shipped.is_shipment_eligible());
        assert!(!QuoteStatus::DISTRIBUTION.contains(&QuoteStatus::ReadyToShip));
    }

    #[test]
    fn test_paid_settles_in_full() {
        let mut q = quote(QuoteStatus::Received);
        assert!(q.apply_status(QuoteStatus::Paid, "2026-10-19T10:00:00.000Z"));
        assert_eq!(q.amount_paid, q.charged_amount);
        assert_eq!(q.paid_at.as_deref(), Some("2026-10-19T10:00:00.000Z"));
        assert_eq!(q.remaining_amount(), 0.0);
    }

    #[test]
    fn test_any_transition_is_allowed() {
        let mut q = quote(QuoteStatus::Paid);
        assert!(q.apply_status(QuoteStatus::Quote, "2026-10-19T10:00:00.000Z"));
        assert_eq!(q.status, QuoteStatus::Quote);
        assert!(!q.apply_status(QuoteStatus::Quote, "2026-10-19T10:00:00.000Z"));
    }
}
