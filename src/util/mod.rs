pub mod error;
pub mod jwt;
pub mod logger;
pub mod object_id;
pub mod password;
pub mod period;
pub mod pricing;
