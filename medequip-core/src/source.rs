use async_trait::async_trait;
use medequip_shared::{MalformedOrder, Order};

/// One entry of a fetched batch. A malformed entry fails on its own, not the whole fetch.
pub type FetchedOrder = Result<Order, MalformedOrder>;

#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Fetch the current batch of orders, unfiltered and in response order
    async fn fetch_orders(&self) -> Result<Vec<FetchedOrder>, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Orders API at {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Orders API unreachable: {0}")]
    Transport(String),

    #[error("Orders payload could not be decoded: {0}")]
    Decode(String),
}
