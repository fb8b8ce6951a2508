//! In-memory collaborators for driving the processor and orchestrator without a network.
//!
//! All mocks write into a shared [`CallJournal`], so a test can assert on the exact
//! interleaving of fetch, alert and update calls across collaborators.

use async_trait::async_trait;
use medequip_core::{
    AlertError, AlertSink, FetchError, FetchedOrder, OrderSource, UpdateError, UpdateSink,
};
use medequip_shared::{Item, Order};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Fetch,
    Alert {
        order_id: String,
        description: String,
        delivery_notification: Option<u32>,
    },
    Update {
        order: Order,
    },
}

/// Ordered log of every call made against the mocks
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallJournal {
    pub async fn record(&self, call: RecordedCall) {
        self.calls.lock().await.push(call);
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Alert attempts, including the ones that failed
    pub async fn alert_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, RecordedCall::Alert { .. }))
            .count()
    }

    /// Orders handed to the update sink, including rejected ones
    pub async fn updates(&self) -> Vec<Order> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Update { order } => Some(order.clone()),
                _ => None,
            })
            .collect()
    }
}

pub struct MockOrderSource {
    journal: CallJournal,
    response: Result<Vec<FetchedOrder>, FetchError>,
}

impl MockOrderSource {
    pub fn with_orders(journal: CallJournal, orders: Vec<Order>) -> Self {
        Self::with_fetched(journal, orders.into_iter().map(Ok).collect())
    }

    /// Serve a batch that may contain entries which failed to decode
    pub fn with_fetched(journal: CallJournal, fetched: Vec<FetchedOrder>) -> Self {
        Self {
            journal,
            response: Ok(fetched),
        }
    }

    pub fn failing(journal: CallJournal, error: FetchError) -> Self {
        Self {
            journal,
            response: Err(error),
        }
    }
}

#[async_trait]
impl OrderSource for MockOrderSource {
    async fn fetch_orders(&self) -> Result<Vec<FetchedOrder>, FetchError> {
        self.journal.record(RecordedCall::Fetch).await;
        self.response.clone()
    }
}

pub struct MockAlertSink {
    journal: CallJournal,
    failing_descriptions: HashSet<String>,
}

impl MockAlertSink {
    pub fn new(journal: CallJournal) -> Self {
        Self {
            journal,
            failing_descriptions: HashSet::new(),
        }
    }

    /// Reject alerts for items with this description
    pub fn fail_for(mut self, description: &str) -> Self {
        self.failing_descriptions.insert(description.to_string());
        self
    }
}

#[async_trait]
impl AlertSink for MockAlertSink {
    async fn send_alert(&self, item: &Item, order_id: &str) -> Result<(), AlertError> {
        self.journal
            .record(RecordedCall::Alert {
                order_id: order_id.to_string(),
                description: item.description(),
                delivery_notification: item.notification_count(),
            })
            .await;

        if self.failing_descriptions.contains(&item.description()) {
            return Err(AlertError::Status { status: 503 });
        }
        Ok(())
    }
}

pub struct MockUpdateSink {
    journal: CallJournal,
    failing_orders: HashSet<String>,
}

impl MockUpdateSink {
    pub fn new(journal: CallJournal) -> Self {
        Self {
            journal,
            failing_orders: HashSet::new(),
        }
    }

    /// Reject the update for this order id
    pub fn fail_for(mut self, order_id: &str) -> Self {
        self.failing_orders.insert(order_id.to_string());
        self
    }
}

#[async_trait]
impl UpdateSink for MockUpdateSink {
    async fn submit_updated_order(&self, order: &Order) -> Result<(), UpdateError> {
        self.journal
            .record(RecordedCall::Update {
                order: order.clone(),
            })
            .await;

        if self.failing_orders.contains(&order.order_id) {
            return Err(UpdateError::Status {
                order_id: order.order_id.clone(),
                status: 500,
            });
        }
        Ok(())
    }
}
