pub mod activity_repo;
pub mod client_repo;
pub mod mongo_store;
pub mod quote_repo;
pub mod repository_error;
pub mod settings_repo;
pub mod tracking_repo;
pub mod user_repo;
