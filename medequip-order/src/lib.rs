pub mod mock;
pub mod orchestrator;
pub mod processor;

pub use orchestrator::{
    OrderError, OrderOutcome, RunError, RunOrchestrator, RunReport, UNKNOWN_ORDER_ID,
};
pub use processor::{AlertFailure, OrderProcessor, ProcessedOrder, ProcessingError};
