use async_trait::async_trait;
use medequip_core::{FetchError, FetchedOrder, OrderSource};
use medequip_shared::Order;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, warn};

/// Reads the current order batch from the upstream orders API
#[derive(Clone)]
pub struct OrdersApiClient {
    client: Client,
    url: String,
}

impl OrdersApiClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl OrderSource for OrdersApiClient {
    async fn fetch_orders(&self) -> Result<Vec<FetchedOrder>, FetchError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            error!("Failed to reach orders API at {}: {}", self.url, e);
            FetchError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Failed to fetch orders from {}. Status code: {}", self.url, status);
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        // Only the outer list has to parse. Entries are decoded one by one so a single bad
        // order doesn't take the rest of the batch down with it.
        let entries: Vec<Value> = serde_json::from_slice(&body).map_err(|e| {
            error!("Orders payload from {} is not a JSON list: {}", self.url, e);
            FetchError::Decode(e.to_string())
        })?;

        let orders: Vec<FetchedOrder> = entries.into_iter().map(Order::from_value).collect();
        for malformed in orders.iter().filter_map(|order| order.as_ref().err()) {
            warn!("Skipping entry from {}: {}", self.url, malformed);
        }

        debug!("Received {} orders from {}", orders.len(), self.url);
        Ok(orders)
    }
}
