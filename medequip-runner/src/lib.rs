use anyhow::Context;
use medequip_infra::{http, AlertApiClient, AppConfig, OrdersApiClient, UpdateApiClient};
use medequip_order::{RunError, RunOrchestrator, RunReport};
use std::sync::Arc;
use tracing::{error, info};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Wire the HTTP collaborators from config into an orchestrator
pub fn build_orchestrator(config: &AppConfig) -> anyhow::Result<RunOrchestrator> {
    let client = http::build_client(&config.http).context("Failed to create HTTP client")?;

    Ok(RunOrchestrator::new(
        Arc::new(OrdersApiClient::new(client.clone(), config.orders_api.url.clone())),
        Arc::new(AlertApiClient::new(client.clone(), config.alert_api.url.clone())),
        Arc::new(UpdateApiClient::new(client, config.update_api.url.clone())),
    ))
}

/// One full run, returning the process exit status
pub async fn execute(config: &AppConfig) -> u8 {
    let orchestrator = match build_orchestrator(config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    let result = orchestrator.run().await;
    if let Ok(report) = &result {
        if report.is_success() {
            info!("Results sent to relevant APIs.");
        }
    }
    exit_status(&result)
}

/// 0 only when the fetch worked and every order was processed and submitted
pub fn exit_status(result: &Result<RunReport, RunError>) -> u8 {
    match result {
        Ok(report) if report.is_success() => EXIT_SUCCESS,
        Ok(_) | Err(_) => EXIT_FAILURE,
    }
}
