use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::handler::tracking_handler::{
    create_batch_shipment_handler, create_tracking_handler, delete_tracking_handler, eligible_quotes_handler,
    get_tracking_handler, list_trackings_handler, update_tracking_handler, update_tracking_payment_handler,
    update_tracking_status_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::tracking_service::TrackingServiceImpl;

pub fn tracking_router(service: Arc<TrackingServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/tracking", get(list_trackings_handler).post(create_tracking_handler))
        .route("/tracking/eligible-quotes", get(eligible_quotes_handler))
        .route("/tracking/batch", post(create_batch_shipment_handler))
        .route(
            "/tracking/{id}",
            get(get_tracking_handler).put(update_tracking_handler).delete(delete_tracking_handler),
        )
        .route("/tracking/{id}/status", patch(update_tracking_status_handler))
        .route("/tracking/{id}/payment", patch(update_tracking_payment_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
