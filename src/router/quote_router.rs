use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::handler::quote_handler::{
    create_quote_handler, delete_quote_handler, get_quote_handler, list_missing_quotes_handler, list_quotes_handler,
    update_quote_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::quote_service::QuoteServiceImpl;

pub fn quote_router(service: Arc<QuoteServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/quotes", get(list_quotes_handler).post(create_quote_handler))
        .route("/quotes/missing", get(list_missing_quotes_handler))
        .route(
            "/quotes/{id}",
            get(get_quote_handler).put(update_quote_handler).delete(delete_quote_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
