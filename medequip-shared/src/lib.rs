pub mod models;

pub use models::{AlertMessage, Item, MalformedOrder, Order, DELIVERED_STATUS};
