use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::handler::dashboard_handler::{
    metrics_handler, quote_status_handler, quotes_comparison_handler, recent_activity_handler, revenue_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::dashboard_service::DashboardServiceImpl;

pub fn dashboard_router(service: Arc<DashboardServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/dashboard/metrics", get(metrics_handler))
        .route("/dashboard/revenue", get(revenue_handler))
        .route("/dashboard/quote-status", get(quote_status_handler))
        .route("/dashboard/quotes-comparison", get(quotes_comparison_handler))
        .route("/dashboard/recent-activity", get(recent_activity_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
