use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness: reports whether storage answers.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.storage.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "plant-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "plant-service",
                "error": e.to_string()
            })),
        ),
    }
}

/// Readiness: storage answers and the vision provider is usable.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = state.storage.health_check().await {
        tracing::warn!("Readiness check failed on storage: {}", e);
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    if let Err(e) = state.vision.health_check().await {
        tracing::warn!(model = %state.vision.model(), "Readiness check failed on vision provider: {}", e);
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
