use async_trait::async_trait;
use medequip_shared::Item;

#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Send a delivery alert for `item`. The item still carries its pre-increment count.
    async fn send_alert(&self, item: &Item, order_id: &str) -> Result<(), AlertError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlertError {
    #[error("Alert API returned status {status}")]
    Status { status: u16 },

    #[error("Alert API unreachable: {0}")]
    Transport(String),
}
