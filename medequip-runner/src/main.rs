use medequip_infra::AppConfig;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "medequip_runner=info,medequip_order=info,medequip_infra=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Start of app");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    ExitCode::from(medequip_runner::execute(&config).await)
}
