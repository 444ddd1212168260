//! Health check endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use crate::services::ServiceHealthStatus;
use crate::state::AppState;

/// `GET /health`: 200 when the roster store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ServiceHealthStatus>) {
    let status = state.services.health_check().await;

    if status.is_healthy() {
        (StatusCode::OK, Json(status))
    } else {
        warn!(issues = ?status.get_issues(), "Health check failed");
        (StatusCode::SERVICE_UNAVAILABLE, Json(status))
    }
}
