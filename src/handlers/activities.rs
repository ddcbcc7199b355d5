use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::activity::{Activity, ActivityRating},
};

// GET /api/activities
#[utoipa::path(
    get,
    path = "/api/activities",
    tag = "Activities",
    responses((status = 200, description = "Active activities", body = Vec<Activity>))
)]
pub async fn list(State(app_state): State<AppState>) -> Result<Json<Vec<Activity>>, AppError> {
    let activities = app_state.storage.get_activities().await?;
    Ok(Json(activities))
}

// GET /api/activities/{id}
#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    tag = "Activities",
    params(("id" = Uuid, Path, description = "Activity id")),
    responses(
        (status = 200, description = "The activity", body = Activity),
        (status = 404, description = "Unknown activity")
    )
)]
pub async fn get_one(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Activity>, AppError> {
    let activity = app_state
        .storage
        .get_activity(id)
        .await?
        .ok_or(AppError::NotFound("activity"))?;
    Ok(Json(activity))
}

// GET /api/activities/{id}/rating
#[utoipa::path(
    get,
    path = "/api/activities/{id}/rating",
    tag = "Activities",
    params(("id" = Uuid, Path, description = "Activity id")),
    responses((status = 200, description = "Average over approved reviews", body = ActivityRating))
)]
pub async fn rating(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActivityRating>, AppError> {
    let rating = app_state.storage.get_activity_rating(id).await?;
    Ok(Json(rating))
}
