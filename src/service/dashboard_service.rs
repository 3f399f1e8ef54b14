use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use futures::future::try_join_all;
use tracing::{debug, instrument};

use crate::dto::dashboard_dto::{
    ComparisonPoint, DashboardMetrics, MonthMetrics, RecentActivity, RecentActivityQuery, RevenuePoint, StatusCount,
};
use crate::model::quote::QuoteStatus;
use crate::repository::activity_repo::ActivityRepository;
use crate::repository::client_repo::ClientRepository;
use crate::repository::quote_repo::{QuoteFilter, QuoteRepository};
use crate::service::client_names;
use crate::util::error::ServiceError;
use crate::util::period::MonthWindow;
use crate::util::pricing::{conversion_rate, percent_change, round2};

const REVENUE_MONTHS: u32 = 12;
const COMPARISON_MONTHS: u32 = 6;
const DEFAULT_ACTIVITY_LIMIT: i64 = 10;
const MAX_ACTIVITY_LIMIT: i64 = 50;

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn metrics(&self) -> Result<DashboardMetrics, ServiceError>;
    async fn revenue_trend(&self) -> Result<Vec<RevenuePoint>, ServiceError>;
    async fn quote_status_distribution(&self) -> Result<Vec<StatusCount>, ServiceError>;
    async fn quotes_comparison(&self) -> Result<Vec<ComparisonPoint>, ServiceError>;
    async fn recent_activity(&self, query: RecentActivityQuery) -> Result<Vec<RecentActivity>, ServiceError>;
}

pub struct DashboardServiceImpl {
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub client_repo: Arc<dyn ClientRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
}

impl DashboardServiceImpl {
    pub fn new(
        quote_repo: Arc<dyn QuoteRepository>,
        client_repo: Arc<dyn ClientRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self { quote_repo, client_repo, activity_repo }
    }

    async fn month_revenue(&self, window: MonthWindow) -> Result<f64, ServiceError> {
        let filter = QuoteFilter::default()
            .with_statuses(&QuoteStatus::REVENUE)
            .created_between(window.bounds());
        Ok(round2(self.quote_repo.sum_charged_amount(&filter).await?))
    }

    async fn month_metrics(&self, window: MonthWindow) -> Result<MonthMetrics, ServiceError> {
        let created = QuoteFilter::default().created_between(window.bounds());
        let pending = created.clone().with_statuses(&QuoteStatus::MISSING_QUOTE);
        let (total_quotes, pending_quotes, revenue) = tokio::try_join!(
            async { Ok::<_, ServiceError>(self.quote_repo.count(&created).await?) },
            async { Ok::<_, ServiceError>(self.quote_repo.count(&pending).await?) },
            self.month_revenue(window),
        )?;
        Ok(MonthMetrics {
            month: window.label(),
            total_quotes,
            pending_quotes,
            revenue,
            conversion_rate: conversion_rate(total_quotes, pending_quotes),
        })
    }

    async fn comparison_point(&self, window: MonthWindow) -> Result<ComparisonPoint, ServiceError> {
        let created = QuoteFilter::default().created_between(window.bounds());
        let paid = QuoteFilter::default().paid_between(window.bounds());
        let (new_quotes, paid_quotes) =
            tokio::try_join!(self.quote_repo.count(&created), self.quote_repo.count(&paid))?;
        Ok(ComparisonPoint { month: window.label(), new_quotes, paid_quotes })
    }
}

#[async_trait]
impl DashboardService for DashboardServiceImpl {
    #[instrument(skip(self))]
    async fn metrics(&self) -> Result<DashboardMetrics, ServiceError> {
        let current = MonthWindow::containing(Utc::now());
        let (current_month, previous_month) =
            tokio::try_join!(self.month_metrics(current), self.month_metrics(current.previous()))?;
        debug!(month = %current_month.month, total = current_month.total_quotes, "Dashboard metrics computed");
        Ok(DashboardMetrics {
            quotes_change: percent_change(previous_month.total_quotes as f64, current_month.total_quotes as f64),
            revenue_change: percent_change(previous_month.revenue, current_month.revenue),
            current_month,
            previous_month,
        })
    }

    #[instrument(skip(self))]
    async fn revenue_trend(&self) -> Result<Vec<RevenuePoint>, ServiceError> {
        let windows = MonthWindow::trailing(Utc::now(), REVENUE_MONTHS);
        try_join_all(windows.into_iter().map(|window| async move {
            Ok::<_, ServiceError>(RevenuePoint {
                month: window.label(),
                revenue: self.month_revenue(window).await?,
            })
        }))
        .await
    }

    #[instrument(skip(self))]
    async fn quote_status_distribution(&self) -> Result<Vec<StatusCount>, ServiceError> {
        let filter = QuoteFilter::default().with_statuses(&QuoteStatus::DISTRIBUTION);
        let counts = self.quote_repo.count_by_status(&filter).await?;
        Ok(QuoteStatus::DISTRIBUTION
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: counts.get(&status).copied().unwrap_or(0),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn quotes_comparison(&self) -> Result<Vec<ComparisonPoint>, ServiceError> {
        let windows = MonthWindow::trailing(Utc::now(), COMPARISON_MONTHS);
        try_join_all(windows.into_iter().map(|window| self.comparison_point(window))).await
    }

    #[instrument(skip(self))]
    async fn recent_activity(&self, query: RecentActivityQuery) -> Result<Vec<RecentActivity>, ServiceError> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
            .clamp(1, MAX_ACTIVITY_LIMIT);
        let activities = self.activity_repo.list_recent(limit).await?;

        let mut quote_ids: Vec<ObjectId> = activities.iter().map(|a| a.quote_id).collect();
        quote_ids.sort();
        quote_ids.dedup();
        let quotes = self.quote_repo.find_by_ids(&quote_ids).await?;
        let mut client_ids: Vec<ObjectId> = quotes.iter().map(|q| q.client_id).collect();
        client_ids.sort();
        client_ids.dedup();
        let names = client_names(self.client_repo.find_by_ids(&client_ids).await?);

        Ok(activities
            .into_iter()
            .map(|activity| {
                let quote = quotes.iter().find(|q| q.id == Some(activity.quote_id));
                RecentActivity {
                    product: quote.map(|q| q.product.clone()),
                    client_name: quote.and_then(|q| names.get(&q.client_id).cloned()),
                    activity,
                }
            })
            .collect())
    }
}
