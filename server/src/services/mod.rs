pub mod auth;
pub mod health_indicator;
