use reqwest::Client;
use std::time::Duration;

use crate::error::AppError;

/// Connection establishment is capped separately from the whole request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for identity-provider calls. `timeout` bounds the whole
/// request so a hung provider surfaces as a timeout instead of a stuck worker.
pub fn new_provider_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))
}
