//! Health check endpoint.

use axum::Json;
use chrono::Utc;

use crate::models::HealthResponse;

/// `GET /api/health` — liveness probe.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        service: "verdict".into(),
        version: verdict_core::version().into(),
        timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    })
}
