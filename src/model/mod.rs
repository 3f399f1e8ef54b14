pub mod activity;
pub mod client;
pub mod quote;
pub mod settings;
pub mod tracking;
pub mod user;
