use async_trait::async_trait;
use medequip_shared::Order;

#[async_trait]
pub trait UpdateSink: Send + Sync {
    /// Push a fully processed order back to the system of record
    async fn submit_updated_order(&self, order: &Order) -> Result<(), UpdateError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateError {
    #[error("Update API returned status {status} for order {order_id}")]
    Status { order_id: String, status: u16 },

    #[error("Update API unreachable: {0}")]
    Transport(String),
}
