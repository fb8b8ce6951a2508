use crate::processor::{OrderProcessor, ProcessedOrder, ProcessingError};
use chrono::{DateTime, Utc};
use medequip_core::{AlertSink, FetchError, FetchedOrder, OrderSource, UpdateError, UpdateSink};
use medequip_shared::{MalformedOrder, Order};
use std::sync::Arc;
use tracing::{debug, error, info, Instrument};
use uuid::Uuid;

/// Drives one pass: fetch every order, process it, push it back
pub struct RunOrchestrator {
    source: Arc<dyn OrderSource>,
    processor: OrderProcessor,
    updates: Arc<dyn UpdateSink>,
}

impl RunOrchestrator {
    pub fn new(
        source: Arc<dyn OrderSource>,
        alerts: Arc<dyn AlertSink>,
        updates: Arc<dyn UpdateSink>,
    ) -> Self {
        Self {
            source,
            processor: OrderProcessor::new(alerts),
            updates,
        }
    }

    /// Run a single batch.
    ///
    /// Only a failed fetch aborts the run. Every fetched entry gets its own outcome in the
    /// report, so an undecodable or malformed order or a rejected update never blocks the
    /// ones after it.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let run_id = Uuid::new_v4();
        self.execute(run_id)
            .instrument(tracing::info_span!("run", %run_id))
            .await
    }

    async fn execute(&self, run_id: Uuid) -> Result<RunReport, RunError> {
        let started_at = Utc::now();
        info!("Start of run");

        // The source has already logged why the fetch failed
        let orders = self.source.fetch_orders().await?;
        info!("Fetched {} orders", orders.len());

        let mut outcomes = Vec::with_capacity(orders.len());
        for fetched in orders {
            outcomes.push(self.handle(fetched).await);
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };

        info!(
            orders = report.outcomes.len(),
            failed = report.failed(),
            alerts_sent = report.alerts_sent(),
            alerts_failed = report.alert_failures(),
            "Run finished"
        );
        Ok(report)
    }

    async fn handle(&self, fetched: FetchedOrder) -> OrderOutcome {
        let (order_id, result) = match fetched {
            Ok(order) => (order.order_id.clone(), self.process_and_submit(order).await),
            Err(malformed) => (
                malformed.order_id.clone().unwrap_or_else(|| UNKNOWN_ORDER_ID.to_string()),
                Err(OrderError::Malformed(malformed)),
            ),
        };

        match &result {
            // The update sink reports its own failures
            Err(e @ OrderError::Update { .. }) => debug!("Order {} failed: {}", order_id, e),
            Err(e) => error!("Order {} failed: {}", order_id, e),
            Ok(_) => {}
        }
        OrderOutcome { order_id, result }
    }

    async fn process_and_submit(&self, order: Order) -> Result<ProcessedOrder, OrderError> {
        let processed = self.processor.process(order).await?;

        if let Err(source) = self.updates.submit_updated_order(&processed.order).await {
            return Err(OrderError::Update {
                processed: Box::new(processed),
                source,
            });
        }
        Ok(processed)
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<OrderOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Alerts delivered, counting orders whose update was later rejected
    pub fn alerts_sent(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(OrderOutcome::processed)
            .map(|p| p.alerts_sent)
            .sum()
    }

    pub fn alert_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(OrderOutcome::processed)
            .map(|p| p.alert_failures.len())
            .sum()
    }

    /// True when every order was processed and submitted. Alert failures don't count against it.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Stands in for the id of a batch entry too broken to carry one
pub const UNKNOWN_ORDER_ID: &str = "<unknown>";

#[derive(Debug)]
pub struct OrderOutcome {
    pub order_id: String,
    pub result: Result<ProcessedOrder, OrderError>,
}

impl OrderOutcome {
    /// The processed order, if processing got that far
    pub fn processed(&self) -> Option<&ProcessedOrder> {
        match &self.result {
            Ok(processed) => Some(processed),
            Err(OrderError::Update { processed, .. }) => Some(processed.as_ref()),
            Err(OrderError::Malformed(_) | OrderError::Processing(_)) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error(transparent)]
    Malformed(#[from] MalformedOrder),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("Failed to send updated order: {source}")]
    Update {
        processed: Box<ProcessedOrder>,
        source: UpdateError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Failed to fetch orders: {0}")]
    Fetch(#[from] FetchError),
}
