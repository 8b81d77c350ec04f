mod api;
mod app;
mod config;
mod domain;
mod error;
mod exports;
mod imports;
mod lifecycle;
mod logging;
mod middleware;
mod routes;
mod services;

use anyhow::Result;

use lifecycle::controller::LifecycleService;
use lifecycle::session::SessionStore;
use services::{ChatClient, RfqDataClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting RFQ portal backend"
    );

    // Create remote service clients
    let rfq_data = RfqDataClient::new(
        &settings.rfq_service_url,
        &settings.rfq_service_sap_client,
        settings.rfq_service_timeout_seconds,
    )?;
    let chat = ChatClient::new(
        &settings.chat_service_url,
        settings.chat_service_timeout_seconds,
    )?;

    // Optionally check remote service health (non-blocking)
    tokio::spawn({
        let rfq_data = rfq_data.clone();
        let chat = chat.clone();
        async move {
            match rfq_data.health_check().await {
                Ok(()) => tracing::info!("RFQ data service is healthy"),
                Err(e) => tracing::warn!(error = %e, "RFQ data service health check failed - will retry on first request"),
            }
            match chat.health_check().await {
                Ok(()) => tracing::info!("Chat service is healthy"),
                Err(e) => tracing::warn!(error = %e, "Chat service health check failed - will retry on first request"),
            }
        }
    });

    // Create the lifecycle service over a fresh session store
    let lifecycle = LifecycleService::new(
        rfq_data.clone(),
        SessionStore::new(),
        &settings.default_currency,
    );

    // Create application state
    let state = app::AppState::new(settings.clone(), lifecycle, rfq_data, chat);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
