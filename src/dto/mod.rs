pub mod client_dto;
pub mod dashboard_dto;
pub mod quote_dto;
pub mod sales_dto;
pub mod settings_dto;
pub mod tracking_dto;
pub mod user_dto;
