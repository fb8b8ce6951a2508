use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Status value that marks an item as delivered. Compared ASCII case-insensitively.
pub const DELIVERED_STATUS: &str = "Delivered";

/// A medical equipment order as served by the upstream orders API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "OrderId", alias = "orderId")]
    pub order_id: String,
    #[serde(rename = "Items", alias = "items")]
    pub items: Vec<Item>,
    /// Fields we don't model, written back untouched on update
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    pub fn new(order_id: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            order_id: order_id.into(),
            items,
            extra: Map::new(),
        }
    }

    /// Decode one entry of a fetched batch. The id is kept on failure when it can be read.
    pub fn from_value(value: Value) -> Result<Self, MalformedOrder> {
        let order_id = ["OrderId", "orderId"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .map(str::to_string);

        serde_json::from_value(value).map_err(|e| MalformedOrder {
            order_id,
            reason: e.to_string(),
        })
    }
}

/// A batch entry that isn't a usable order: not an object, no string `OrderId`, or no `Items` list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Order {} could not be decoded: {reason}", .order_id.as_deref().unwrap_or("<unknown>"))]
pub struct MalformedOrder {
    pub order_id: Option<String>,
    pub reason: String,
}

/// A single line item within an order.
///
/// The upstream fields are kept as raw JSON so that an absent key, an explicit `null` and an
/// oddly typed value all go back to the update API exactly as they arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(
        rename = "Description",
        alias = "description",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Value>,
    #[serde(
        rename = "Status",
        alias = "status",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<Value>,
    #[serde(
        rename = "deliveryNotification",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivery_notification: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `None` only when the key is absent; `null` is kept as `Some(Value::Null)`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Item {
    pub fn new(
        description: impl Into<String>,
        status: impl Into<String>,
        delivery_notification: u32,
    ) -> Self {
        Self {
            description: Some(Value::String(description.into())),
            status: Some(Value::String(status.into())),
            delivery_notification: Some(Value::from(delivery_notification)),
            extra: Map::new(),
        }
    }

    /// Description as text. Absent or null reads as empty, other values as their JSON form.
    pub fn description(&self) -> String {
        match &self.description {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Exact match against "Delivered" after ASCII casefolding. No trimming.
    pub fn is_delivered(&self) -> bool {
        matches!(
            &self.status,
            Some(Value::String(status)) if status.eq_ignore_ascii_case(DELIVERED_STATUS)
        )
    }

    /// The counter, if it holds a non-negative integer that fits in a `u32`
    pub fn notification_count(&self) -> Option<u32> {
        self.delivery_notification
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|count| u32::try_from(count).ok())
    }

    pub fn set_notification_count(&mut self, count: u32) {
        self.delivery_notification = Some(Value::from(count));
    }
}
