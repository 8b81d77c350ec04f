use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub rfq_data_service: String,
    pub chat_service: String,
}

/// Health check endpoint - public
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    // Check both remote services in parallel
    let (rfq_result, chat_result) = tokio::join!(
        state.rfq_data.health_check(),
        state.chat.health_check(),
    );

    let rfq_status = if rfq_result.is_ok() { "ok" } else { "error" };
    let chat_status = if chat_result.is_ok() { "ok" } else { "error" };

    // The RFQ data service is critical; chat only degrades
    let status = if rfq_result.is_ok() && chat_result.is_ok() {
        "healthy"
    } else if rfq_result.is_ok() {
        "degraded"
    } else {
        "unhealthy"
    };

    let status_code = if status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                rfq_data_service: rfq_status.to_string(),
                chat_service: chat_status.to_string(),
            },
        }),
    )
}
