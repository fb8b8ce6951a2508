pub mod alert_api;
pub mod app_config;
pub mod http;
pub mod orders_api;
pub mod update_api;

pub use alert_api::AlertApiClient;
pub use app_config::AppConfig;
pub use orders_api::OrdersApiClient;
pub use update_api::UpdateApiClient;
