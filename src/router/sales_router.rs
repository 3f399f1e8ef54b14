use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::handler::sales_handler::{
    list_sales_handler, sales_summary_handler, unpaid_orders_handler, update_sale_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::sales_service::SalesServiceImpl;

pub fn sales_router(service: Arc<SalesServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/sales", get(list_sales_handler))
        .route("/sales/summary", get(sales_summary_handler))
        .route("/sales/unpaid", get(unpaid_orders_handler))
        .route("/sales/{id}", put(update_sale_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
