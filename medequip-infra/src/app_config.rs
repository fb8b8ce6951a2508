use config::{ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_orders_api")]
    pub orders_api: EndpointConfig,
    #[serde(default = "default_alert_api")]
    pub alert_api: EndpointConfig,
    #[serde(default = "default_update_api")]
    pub update_api: EndpointConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("medequip/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

fn endpoint(url: &str) -> EndpointConfig {
    EndpointConfig { url: url.to_string() }
}

fn default_orders_api() -> EndpointConfig {
    endpoint("https://orders-api.com/orders")
}

fn default_alert_api() -> EndpointConfig {
    endpoint("https://alert-api.com/alerts")
}

fn default_update_api() -> EndpointConfig {
    endpoint("https://update-api.com/update")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            orders_api: default_orders_api(),
            alert_api: default_alert_api(),
            update_api: default_update_api(),
            http: HttpConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `./config` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        Self::load_with(dir, Environment::with_prefix("MEDEQUIP").separator("__"))
    }

    fn load_with(dir: &Path, environment: Environment) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let file = |name: &str| File::with_name(&dir.join(name).to_string_lossy()).required(false);

        let settings = config::Config::builder()
            .add_source(file("default"))
            .add_source(file(run_mode.as_str()))
            // Local overrides, never checked in
            .add_source(file("local"))
            // Eg. `MEDEQUIP__ORDERS_API__URL=http://localhost:8080/orders`
            .add_source(environment)
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, endpoint) in [
            ("orders_api.url", &self.orders_api),
            ("alert_api.url", &self.alert_api),
            ("update_api.url", &self.update_api),
        ] {
            if endpoint.url.trim().is_empty() {
                return Err(ConfigError::Message(format!("{} must not be empty", key)));
            }
        }
        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::Message("http.timeout_seconds must be positive".to_string()));
        }
        Ok(())
    }
}
