//! Firebase Token Exchange Server Library
//!
//! Exchanges Firebase ID tokens for locally signed session tokens and
//! reports service health.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::AppSettings;
pub use error::AppError;
pub use services::auth::{AuthenticationService, SessionTokenIssuer};
