use async_trait::async_trait;
use medequip_core::{UpdateError, UpdateSink};
use medequip_shared::Order;
use reqwest::Client;
use tracing::{error, info};

/// Pushes processed orders to the update API, body is the order as-is
#[derive(Clone)]
pub struct UpdateApiClient {
    client: Client,
    url: String,
}

impl UpdateApiClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl UpdateSink for UpdateApiClient {
    async fn submit_updated_order(&self, order: &Order) -> Result<(), UpdateError> {
        let response = self
            .client
            .post(&self.url)
            .json(order)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send updated order {}: {}", order.order_id, e);
                UpdateError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                "Failed to send updated order for processing: OrderId {}. Status code: {}",
                order.order_id, status
            );
            return Err(UpdateError::Status {
                order_id: order.order_id.clone(),
                status: status.as_u16(),
            });
        }

        info!("Updated order sent for processing: OrderId {}", order.order_id);
        Ok(())
    }
}
