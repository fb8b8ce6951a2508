use crate::app_config::HttpConfig;
use reqwest::Client;
use std::time::Duration;

/// Shared client for all three APIs. Every request is bounded by the configured timeout.
pub fn build_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
}
