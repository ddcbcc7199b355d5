use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::review::{CreateReviewPayload, Review, ReviewWithActivity},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsQuery {
    pub activity_id: Option<Uuid>,
}

// GET /api/reviews
//
// Public listing: approved reviews only, newest first.
#[utoipa::path(
    get,
    path = "/api/reviews",
    tag = "Reviews",
    params(ReviewsQuery),
    responses((status = 200, description = "Approved reviews", body = Vec<ReviewWithActivity>))
)]
pub async fn list(
    State(app_state): State<AppState>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<Vec<ReviewWithActivity>>, AppError> {
    let reviews = app_state
        .storage
        .get_reviews(query.activity_id, true)
        .await?;
    Ok(Json(reviews))
}

// POST /api/reviews
//
// Reviews start unapproved and stay out of the public listing until an
// admin flips the flag.
#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "Reviews",
    request_body = CreateReviewPayload,
    responses(
        (status = 201, description = "Review created unapproved", body = Review),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Unknown activity")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateReviewPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validation)?;

    // The review must point at a real activity.
    app_state
        .storage
        .get_activity(payload.activity_id)
        .await?
        .ok_or(AppError::NotFound("activity"))?;

    let review = app_state.storage.create_review(payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}
