use serde::{Deserialize, Serialize};

use crate::model::activity::Activity;
use crate::model::quote::QuoteStatus;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthMetrics {
    pub month: String,
    pub total_quotes: u64,
    pub pending_quotes: u64,
    pub revenue: f64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub current_month: MonthMetrics,
    pub previous_month: MonthMetrics,
    pub quotes_change: f64,
    pub revenue_change: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenuePoint {
    pub month: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: QuoteStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPoint {
    pub month: String,
    pub new_quotes: u64,
    pub paid_quotes: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentActivityQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    #[serde(flatten)]
    pub activity: Activity,
    pub product: Option<String>,
    pub client_name: Option<String>,
}
