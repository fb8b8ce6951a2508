pub mod alert;
pub mod order;

pub use alert::AlertMessage;
pub use order::{Item, MalformedOrder, Order, DELIVERED_STATUS};
