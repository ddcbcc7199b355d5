use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::i18n::Locale,
    models::booking::{Booking, CreateBookingPayload},
};

// POST /api/bookings
//
// The price snapshot is taken here; the response carries the computed
// totalAmount. The generated WhatsApp links are logged for staff, delivery
// stays manual.
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    request_body = CreateBookingPayload,
    responses(
        (status = 201, description = "Booking created pending/unpaid", body = Booking),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Unknown activity")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateBookingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validation)?;

    let booking = app_state.booking_service.create(payload, &locale.0).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}
