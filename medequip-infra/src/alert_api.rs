use async_trait::async_trait;
use medequip_core::{AlertError, AlertSink};
use medequip_shared::{AlertMessage, Item};
use reqwest::Client;
use tracing::{info, warn};

/// Posts delivery alerts to the alert API
#[derive(Clone)]
pub struct AlertApiClient {
    client: Client,
    url: String,
}

impl AlertApiClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl AlertSink for AlertApiClient {
    async fn send_alert(&self, item: &Item, order_id: &str) -> Result<(), AlertError> {
        let alert = AlertMessage::delivered(order_id, item);
        let description = item.description();

        let response = self
            .client
            .post(&self.url)
            .json(&alert)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to send alert for delivered item {}: {}", description, e);
                AlertError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "Failed to send alert for delivered item {}. Status code: {}",
                description, status
            );
            return Err(AlertError::Status { status: status.as_u16() });
        }

        info!("Alert sent for delivered item: Order {}, Item: {}", order_id, description);
        Ok(())
    }
}
