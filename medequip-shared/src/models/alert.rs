use serde::{Deserialize, Serialize};

use super::order::Item;

/// Payload posted to the alert API for a delivered item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    #[serde(rename = "Message")]
    pub message: String,
}

impl AlertMessage {
    /// Builds the alert text for `item`. The count is whatever the item carries right now,
    /// so callers must build this before incrementing.
    pub fn delivered(order_id: &str, item: &Item) -> Self {
        let count = item.notification_count().unwrap_or_default();
        Self {
            message: format!(
                "Alert for delivered item: Order {}, Item: {}, Delivery Notifications: {}",
                order_id,
                item.description(),
                count
            ),
        }
    }
}
