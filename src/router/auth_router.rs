use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handler::auth_handler::{
    change_password_handler, login_handler, logout_handler, me_handler, refresh_token_handler, register_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::user_service::UserServiceImpl;

pub fn auth_router(service: Arc<UserServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/refresh-token", post(refresh_token_handler))
        .route("/auth/logout", post(logout_handler));

    let authenticated = Router::new()
        .route("/auth/me", get(me_handler))
        .route("/auth/change-password", post(change_password_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public.merge(authenticated).with_state(service)
}
