use plant_core::observability::init_tracing;
use plant_service::config::PlantConfig;
use plant_service::services::init_metrics;
use plant_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = PlantConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "plant-service",
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );

    // Must be installed before any metrics are recorded
    init_metrics();

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start plant-service: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
