use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminAccess, RequireRole, SuperadminAccess},
    models::analytics::{
        ActivityBookingCount, BookingAnalytics, DatabaseHealth, EarningsAnalytics, ServerHealth,
        SystemHealth,
    },
};

// All numbers here come from real aggregation over the stored bookings.

// GET /api/admin/analytics/earnings  (superadmin only, CEO dashboard)
#[utoipa::path(
    get,
    path = "/api/admin/analytics/earnings",
    tag = "Analytics",
    responses((status = 200, description = "Collected cash, this month vs last", body = EarningsAnalytics)),
    security(("session_cookie" = []))
)]
pub async fn earnings(
    State(app_state): State<AppState>,
    _gate: RequireRole<SuperadminAccess>,
) -> Result<Json<EarningsAnalytics>, AppError> {
    let analytics = app_state.storage.earnings_analytics().await?;
    Ok(Json(analytics))
}

// GET /api/admin/analytics/bookings
#[utoipa::path(
    get,
    path = "/api/admin/analytics/bookings",
    tag = "Analytics",
    responses((status = 200, description = "Booking counts by lifecycle status", body = BookingAnalytics)),
    security(("session_cookie" = []))
)]
pub async fn bookings(
    State(app_state): State<AppState>,
    _gate: RequireRole<AdminAccess>,
) -> Result<Json<BookingAnalytics>, AppError> {
    let analytics = app_state.storage.booking_analytics().await?;
    Ok(Json(analytics))
}

// GET /api/admin/analytics/activities
#[utoipa::path(
    get,
    path = "/api/admin/analytics/activities",
    tag = "Analytics",
    responses((status = 200, description = "Per-activity booking counts", body = Vec<ActivityBookingCount>)),
    security(("session_cookie" = []))
)]
pub async fn activities(
    State(app_state): State<AppState>,
    _gate: RequireRole<AdminAccess>,
) -> Result<Json<Vec<ActivityBookingCount>>, AppError> {
    let analytics = app_state.storage.activity_analytics().await?;
    Ok(Json(analytics))
}

// GET /api/admin/system-health  (superadmin only)
#[utoipa::path(
    get,
    path = "/api/admin/system-health",
    tag = "Analytics",
    responses((status = 200, description = "Storage and process health", body = SystemHealth)),
    security(("session_cookie" = []))
)]
pub async fn system_health(
    State(app_state): State<AppState>,
    _gate: RequireRole<SuperadminAccess>,
) -> Result<Json<SystemHealth>, AppError> {
    let status = match app_state.storage.ping().await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(SystemHealth {
        database: DatabaseHealth {
            backend: app_state.storage.backend_name().to_string(),
            status: status.to_string(),
            last_check: Utc::now(),
        },
        server: ServerHealth {
            uptime_seconds: app_state.started_at.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    }))
}
