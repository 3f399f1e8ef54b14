use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
};

use crate::dto::dashboard_dto::RecentActivityQuery;
use crate::service::dashboard_service::{DashboardService, DashboardServiceImpl};
use crate::util::error::HandlerError;

pub async fn metrics_handler(
    State(service): State<Arc<DashboardServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.metrics().await?))
}

pub async fn revenue_handler(
    State(service): State<Arc<DashboardServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.revenue_trend().await?))
}

pub async fn quote_status_handler(
    State(service): State<Arc<DashboardServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.quote_status_distribution().await?))
}

pub async fn quotes_comparison_handler(
    State(service): State<Arc<DashboardServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.quotes_comparison().await?))
}

pub async fn recent_activity_handler(
    State(service): State<Arc<DashboardServiceImpl>>,
    Query(query): Query<RecentActivityQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.recent_activity(query).await?))
}
