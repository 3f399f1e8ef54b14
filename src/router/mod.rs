pub mod auth_router;
pub mod client_router;
pub mod dashboard_router;
pub mod quote_router;
pub mod sales_router;
pub mod settings_router;
pub mod tracking_router;
