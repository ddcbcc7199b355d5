use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

use crate::{config::AppState, models::analytics::HealthResponse};

// GET /api/health
//
// Deployment probe: proves the storage answers queries, not just that the
// process is up.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Healthy", body = HealthResponse),
        (status = 503, description = "Storage unreachable")
    )
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    match app_state.storage.count_activities().await {
        Ok(count) => (
            StatusCode::OK,
            Json(
                serde_json::to_value(HealthResponse {
                    status: "healthy".to_string(),
                    timestamp: Utc::now(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    database: "connected".to_string(),
                    activities: count,
                    environment: app_state.config.environment.clone(),
                })
                .unwrap_or_else(|_| json!({ "status": "healthy" })),
            ),
        ),
        Err(e) => {
            tracing::error!("health check failed: {e:?}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "timestamp": Utc::now(),
                    "error": "Database connection failed"
                })),
            )
        }
    }
}
