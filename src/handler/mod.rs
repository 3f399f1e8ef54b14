pub mod auth_handler;
pub mod client_handler;
pub mod dashboard_handler;
pub mod quote_handler;
pub mod sales_handler;
pub mod settings_handler;
pub mod tracking_handler;
