use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::handler::settings_handler::{get_settings_handler, update_settings_handler};
use crate::middlewares::auth_middleware::{require_admin, require_auth, AuthState};
use crate::service::settings_service::SettingsServiceImpl;

pub fn settings_router(service: Arc<SettingsServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    let authenticated = Router::new()
        .route("/settings", get(get_settings_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    let admin = Router::new()
        .route("/settings", put(update_settings_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    authenticated.merge(admin).with_state(service)
}
