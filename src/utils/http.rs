// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::AlertConfig;

const USER_AGENT: &str = concat!("listing-recon/", env!("CARGO_PKG_VERSION"));

/// Create a configured asynchronous HTTP client for alert delivery.
pub fn create_async_client(config: &AlertConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
