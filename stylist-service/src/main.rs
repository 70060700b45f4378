use service_core::observability::init_tracing;
use stylist_service::config::StylistConfig;
use stylist_service::services::metrics::init_metrics;
use stylist_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = StylistConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "stylist-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );
    init_metrics();

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    tracing::info!(port = app.port(), "stylist-service listening");

    app.run_until_stopped().await
}
