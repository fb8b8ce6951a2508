use medequip_core::{AlertError, AlertSink};
use medequip_shared::Order;
use std::sync::Arc;
use tracing::debug;

/// Raises delivery alerts for an order and bumps the per-item notification counters
pub struct OrderProcessor {
    alerts: Arc<dyn AlertSink>,
}

/// An order after one processing pass, plus what happened on the alert side
#[derive(Debug, Clone)]
pub struct ProcessedOrder {
    pub order: Order,
    pub alerts_sent: usize,
    pub alert_failures: Vec<AlertFailure>,
}

/// An alert that could not be delivered. The item's counter was left as is.
#[derive(Debug, Clone)]
pub struct AlertFailure {
    pub position: usize,
    pub description: String,
    pub error: AlertError,
}

impl OrderProcessor {
    pub fn new(alerts: Arc<dyn AlertSink>) -> Self {
        Self { alerts }
    }

    /// Alert on every delivered item, in item order, then increment its counter.
    ///
    /// The whole order is validated before the first alert goes out, so a malformed
    /// order causes no side effects at all. An item whose alert fails keeps its count.
    pub async fn process(&self, mut order: Order) -> Result<ProcessedOrder, ProcessingError> {
        let delivered = delivered_positions(&order)?;

        let mut alerts_sent = 0;
        let mut alert_failures = Vec::new();

        for position in delivered {
            let item = &mut order.items[position];

            match self.alerts.send_alert(item, &order.order_id).await {
                Ok(()) => {
                    if let Some(count) = item.notification_count() {
                        item.set_notification_count(count + 1);
                    }
                    alerts_sent += 1;
                }
                // The sink logs its own failures; keep the count so it isn't claimed as sent
                Err(error) => {
                    debug!(
                        "Leaving order {} item {} at its current count after failed alert",
                        order.order_id, position
                    );
                    alert_failures.push(AlertFailure {
                        position,
                        description: item.description(),
                        error,
                    });
                }
            }
        }

        Ok(ProcessedOrder {
            order,
            alerts_sent,
            alert_failures,
        })
    }
}

/// Positions of delivered items, or the first reason the order can't be processed
fn delivered_positions(order: &Order) -> Result<Vec<usize>, ProcessingError> {
    let mut delivered = Vec::new();

    for (position, item) in order.items.iter().enumerate() {
        if item.status.is_none() {
            return Err(ProcessingError::MalformedItem {
                order_id: order.order_id.clone(),
                position,
                field: "Status",
            });
        }

        if !item.is_delivered() {
            debug!("Order {} item {} not delivered, passing through", order.order_id, position);
            continue;
        }

        match item.notification_count() {
            None => {
                return Err(ProcessingError::MalformedItem {
                    order_id: order.order_id.clone(),
                    position,
                    field: "deliveryNotification",
                })
            }
            Some(u32::MAX) => {
                return Err(ProcessingError::CounterOverflow {
                    order_id: order.order_id.clone(),
                    position,
                })
            }
            Some(_) => delivered.push(position),
        }
    }

    Ok(delivered)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessingError {
    #[error("Order {order_id} item {position} has a missing or invalid {field}")]
    MalformedItem {
        order_id: String,
        position: usize,
        field: &'static str,
    },

    #[error("Order {order_id} item {position} delivery notification counter is at its maximum")]
    CounterOverflow { order_id: String, position: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{CallJournal, MockAlertSink, RecordedCall};
    use medequip_shared::Item;
    use serde_json::json;

    fn processor(journal: &CallJournal) -> OrderProcessor {
        OrderProcessor::new(Arc::new(MockAlertSink::new(journal.clone())))
    }

    #[tokio::test]
    async fn test_delivered_items_alerted_then_incremented() {
        let journal = CallJournal::default();
        let order = Order::new(
            "1234",
            vec![
                Item::new("Test1", "Delivered", 0),
                Item::new("Test2", "Waiting", 0),
                Item::new("Test3", "Delivered", 4),
            ],
        );

        let processed = processor(&journal).process(order.clone()).await.unwrap();

        assert_eq!(processed.order.order_id, "1234");
        assert_eq!(processed.order.items[0].notification_count(), Some(1));
        assert_eq!(processed.order.items[1], order.items[1]);
        assert_eq!(processed.order.items[2].notification_count(), Some(5));
        assert_eq!(processed.alerts_sent, 2);
        assert!(processed.alert_failures.is_empty());

        // Each alert saw the count from before the increment
        assert_eq!(
            journal.calls().await,
            vec![
                RecordedCall::Alert {
                    order_id: "1234".to_string(),
                    description: "Test1".to_string(),
                    delivery_notification: Some(0),
                },
                RecordedCall::Alert {
                    order_id: "1234".to_string(),
                    description: "Test3".to_string(),
                    delivery_notification: Some(4),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_status_match_is_case_insensitive_but_exact() {
        let journal = CallJournal::default();
        let order = Order::new(
            "A",
            vec![
                Item::new("upper", "DELIVERED", 0),
                Item::new("lower", "delivered", 0),
                Item::new("trailing", "delivered ", 0),
                Item::new("leading", " Delivered", 0),
            ],
        );

        let processed = processor(&journal).process(order).await.unwrap();
        let counts: Vec<_> = processed
            .order
            .items
            .iter()
            .map(Item::notification_count)
            .collect();

        assert_eq!(counts, vec![Some(1), Some(1), Some(0), Some(0)]);
        assert_eq!(journal.alert_count().await, 2);
    }

    #[tokio::test]
    async fn test_item_order_and_identity_preserved() {
        let journal = CallJournal::default();
        let mut order = Order::new(
            "keep-me",
            vec![
                Item::new("c", "Waiting", 0),
                Item::new("a", "Delivered", 7),
                Item::new("b", "Shipped", 2),
            ],
        );
        order.extra.insert("Region".to_string(), "north".into());

        let processed = processor(&journal).process(order.clone()).await.unwrap();

        assert_eq!(processed.order.order_id, order.order_id);
        assert_eq!(processed.order.extra, order.extra);
        let descriptions: Vec<_> = processed.order.items.iter().map(Item::description).collect();
        assert_eq!(descriptions, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_order_passes_through() {
        let journal = CallJournal::default();
        let processed = processor(&journal).process(Order::new("empty", vec![])).await.unwrap();

        assert!(processed.order.items.is_empty());
        assert_eq!(processed.alerts_sent, 0);
        assert!(journal.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_alert_skips_increment_and_continues() {
        let journal = CallJournal::default();
        let alerts = MockAlertSink::new(journal.clone()).fail_for("Test1");
        let processor = OrderProcessor::new(Arc::new(alerts));
        let order = Order::new(
            "1234",
            vec![
                Item::new("Test1", "Delivered", 3),
                Item::new("Test2", "Delivered", 0),
            ],
        );

        let processed = processor.process(order).await.unwrap();

        assert_eq!(processed.order.items[0].notification_count(), Some(3));
        assert_eq!(processed.order.items[1].notification_count(), Some(1));
        assert_eq!(processed.alerts_sent, 1);
        assert_eq!(processed.alert_failures.len(), 1);
        assert_eq!(processed.alert_failures[0].position, 0);
        assert_eq!(processed.alert_failures[0].description, "Test1");
        assert_eq!(journal.alert_count().await, 2);
    }

    #[tokio::test]
    async fn test_missing_status_fails_before_any_alert() {
        let journal = CallJournal::default();
        let mut broken = Item::new("no status", "Delivered", 0);
        broken.status = None;
        let order = Order::new("bad", vec![Item::new("first", "Delivered", 0), broken]);

        let err = processor(&journal).process(order).await.unwrap_err();

        assert_eq!(
            err,
            ProcessingError::MalformedItem {
                order_id: "bad".to_string(),
                position: 1,
                field: "Status",
            }
        );
        assert!(journal.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_counter_only_matters_when_delivered() {
        let journal = CallJournal::default();

        let mut waiting = Item::new("waiting", "Waiting", 0);
        waiting.delivery_notification = None;
        let processed = processor(&journal)
            .process(Order::new("ok", vec![waiting.clone()]))
            .await
            .unwrap();
        assert_eq!(processed.order.items[0], waiting);

        let mut delivered = Item::new("delivered", "Delivered", 0);
        delivered.delivery_notification = None;
        let err = processor(&journal)
            .process(Order::new("bad", vec![delivered]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::MalformedItem { field: "deliveryNotification", position: 0, .. }
        ));
        assert!(journal.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_counter_at_max_is_rejected() {
        let journal = CallJournal::default();
        let order = Order::new("max", vec![Item::new("x", "Delivered", u32::MAX)]);

        let err = processor(&journal).process(order).await.unwrap_err();

        assert!(matches!(err, ProcessingError::CounterOverflow { position: 0, .. }));
        assert!(journal.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_unusable_counter_on_delivered_item_is_malformed() {
        for counter in [json!(null), json!(-1), json!("3"), json!(1.5)] {
            let journal = CallJournal::default();
            let mut delivered = Item::new("pump", "Delivered", 0);
            delivered.delivery_notification = Some(counter.clone());
            let order = Order::new("bad", vec![Item::new("ok", "Delivered", 0), delivered]);

            let err = processor(&journal).process(order).await.unwrap_err();

            assert_eq!(
                err,
                ProcessingError::MalformedItem {
                    order_id: "bad".to_string(),
                    position: 1,
                    field: "deliveryNotification",
                },
                "counter {counter}"
            );
            assert!(journal.calls().await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_null_fields_on_waiting_item_pass_through() {
        let journal = CallJournal::default();
        let mut waiting = Item::new("gauze", "Waiting", 0);
        waiting.description = Some(json!(null));
        waiting.delivery_notification = Some(json!(null));
        let mut unknown_status = Item::new("mask", "Delivered", 2);
        unknown_status.status = Some(json!(null));

        let order = Order::new("ok", vec![waiting.clone(), unknown_status.clone()]);
        let processed = processor(&journal).process(order).await.unwrap();

        assert_eq!(processed.order.items, vec![waiting, unknown_status]);
        assert!(journal.calls().await.is_empty());
    }

    /// Records the level of every event emitted while installed
    #[derive(Clone, Default)]
    struct LevelRecorder(Arc<std::sync::Mutex<Vec<tracing::Level>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LevelRecorder {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[tokio::test]
    async fn test_alert_outcomes_are_left_to_the_sink_to_report() {
        use tracing_subscriber::layer::SubscriberExt;

        let recorder = LevelRecorder::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(recorder.clone()),
        );

        let journal = CallJournal::default();
        let alerts = MockAlertSink::new(journal.clone()).fail_for("Test1");
        let order = Order::new(
            "1234",
            vec![
                Item::new("Test1", "Delivered", 0),
                Item::new("Test2", "Delivered", 0),
            ],
        );

        let processed = OrderProcessor::new(Arc::new(alerts)).process(order).await.unwrap();

        assert_eq!(processed.alerts_sent, 1);
        assert_eq!(processed.alert_failures.len(), 1);
        let levels = recorder.0.lock().unwrap().clone();
        assert!(!levels.is_empty());
        assert!(levels.iter().all(|level| *level == tracing::Level::DEBUG), "{levels:?}");
    }
}
