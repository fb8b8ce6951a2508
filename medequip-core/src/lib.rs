//! Collaborator seams around order processing.
//!
//! Each external system the run talks to sits behind a small async trait so the
//! processing logic can be driven by HTTP clients in production and in-memory fakes in tests.

pub mod alerts;
pub mod source;
pub mod updates;

pub use alerts::{AlertError, AlertSink};
pub use source::{FetchError, FetchedOrder, OrderSource};
pub use updates::{UpdateError, UpdateSink};
