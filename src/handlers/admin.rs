use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminAccess, RequireRole, SuperadminAccess},
    models::{
        activity::{
            Activity, CreateActivityPayload, UpdateActivityPayload,
            UpdateGetYourGuidePricePayload,
        },
        audit::{AuditLog, InsertAuditLog},
        booking::{
            Booking, BookingWithActivity, PaymentStatus, UpdateBookingPaymentPayload,
            UpdateBookingStatusPayload,
        },
        review::{ReviewWithActivity, UpdateReviewApprovalPayload},
    },
    services::{
        bookings::parse_price,
        whatsapp::{BookingNotification, PaymentKind, WhatsAppContact},
    },
};

// =============================================================================
//  BOOKING MANAGEMENT (admin or above)
// =============================================================================

// GET /api/admin/bookings
#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    tag = "Admin",
    responses((status = 200, description = "All bookings, newest first", body = Vec<BookingWithActivity>)),
    security(("session_cookie" = []))
)]
pub async fn list_bookings(
    State(app_state): State<AppState>,
    _gate: RequireRole<AdminAccess>,
) -> Result<Json<Vec<BookingWithActivity>>, AppError> {
    let bookings = app_state.storage.get_bookings().await?;
    Ok(Json(bookings))
}

// PATCH /api/admin/bookings/{id}/status
#[utoipa::path(
    patch,
    path = "/api/admin/bookings/{id}/status",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Booking id")),
    request_body = UpdateBookingStatusPayload,
    responses(
        (status = 200, description = "Updated booking", body = Booking),
        (status = 404, description = "Unknown booking")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_booking_status(
    State(app_state): State<AppState>,
    gate: RequireRole<AdminAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusPayload>,
) -> Result<Json<Booking>, AppError> {
    let booking = app_state
        .storage
        .update_booking_status(id, payload.status)
        .await?
        .ok_or(AppError::NotFound("booking"))?;

    app_state
        .storage
        .create_audit_log(InsertAuditLog {
            user_id: gate.user.id,
            action: format!("Updated booking {id} status to {}", payload.status.as_str()),
            details: Some(json!({ "bookingId": id, "status": payload.status }).to_string()),
        })
        .await?;

    Ok(Json(booking))
}

// PATCH /api/admin/bookings/{id}/payment
//
// Payment fields are written as sent. The admin client computes paidAmount
// for the full/deposit/balance flows; the server only warns in the log when
// the numbers disagree.
#[utoipa::path(
    patch,
    path = "/api/admin/bookings/{id}/payment",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Booking id")),
    request_body = UpdateBookingPaymentPayload,
    responses(
        (status = 200, description = "Updated booking", body = Booking),
        (status = 404, description = "Unknown booking")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_booking_payment(
    State(app_state): State<AppState>,
    gate: RequireRole<AdminAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingPaymentPayload>,
) -> Result<Json<Booking>, AppError> {
    let payment_status = payload.payment_status;
    let paid_amount = payload.paid_amount;

    let booking = app_state
        .storage
        .update_booking_payment(id, payload)
        .await?
        .ok_or(AppError::NotFound("booking"))?;

    let total = parse_price(&booking.total_amount);
    if paid_amount > total {
        tracing::warn!(
            booking = %id,
            paid_amount,
            total,
            "paidAmount exceeds totalAmount"
        );
    }

    app_state
        .storage
        .create_audit_log(InsertAuditLog {
            user_id: gate.user.id,
            action: format!(
                "Updated booking {id} payment status to {}",
                payment_status.as_str()
            ),
            details: Some(format!(
                "Payment updated for booking {id}: {}, paid: {paid_amount} MAD",
                payment_status.as_str()
            )),
        })
        .await?;

    // Payment confirmation links for staff, logged like the booking alert.
    if let Some(with_activity) = app_state.storage.get_booking(id).await? {
        if let Some(activity) = &with_activity.activity {
            let kind = if payment_status == PaymentStatus::FullyPaid {
                PaymentKind::Full
            } else {
                PaymentKind::Deposit
            };
            let notification =
                BookingNotification::from_booking(&with_activity.booking, activity);
            app_state.whatsapp.notify_payment_updated(&notification, kind);
        }
    }

    Ok(Json(booking))
}

// =============================================================================
//  ACTIVITY MANAGEMENT (admin or above)
// =============================================================================

// POST /api/admin/activities
#[utoipa::path(
    post,
    path = "/api/admin/activities",
    tag = "Admin",
    request_body = CreateActivityPayload,
    responses((status = 201, description = "Activity created", body = Activity)),
    security(("session_cookie" = []))
)]
pub async fn create_activity(
    State(app_state): State<AppState>,
    gate: RequireRole<AdminAccess>,
    Json(payload): Json<CreateActivityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validation)?;

    let activity = app_state.storage.create_activity(payload).await?;

    app_state
        .storage
        .create_audit_log(InsertAuditLog {
            user_id: gate.user.id,
            action: format!("Created activity: {}", activity.name),
            details: Some(json!({ "activityId": activity.id }).to_string()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(activity)))
}

// PUT /api/admin/activities/{id}
#[utoipa::path(
    put,
    path = "/api/admin/activities/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Activity id")),
    request_body = UpdateActivityPayload,
    responses(
        (status = 200, description = "Updated activity", body = Activity),
        (status = 404, description = "Unknown activity")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_activity(
    State(app_state): State<AppState>,
    gate: RequireRole<AdminAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateActivityPayload>,
) -> Result<Json<Activity>, AppError> {
    payload.validate().map_err(AppError::Validation)?;

    let activity = app_state
        .storage
        .update_activity(id, payload)
        .await?
        .ok_or(AppError::NotFound("activity"))?;

    app_state
        .storage
        .create_audit_log(InsertAuditLog {
            user_id: gate.user.id,
            action: format!("Updated activity: {}", activity.name),
            details: Some(json!({ "activityId": id }).to_string()),
        })
        .await?;

    Ok(Json(activity))
}

// DELETE /api/admin/activities/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/activities/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Activity id")),
    responses(
        (status = 200, description = "Activity deleted"),
        (status = 404, description = "Unknown activity")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_activity(
    State(app_state): State<AppState>,
    gate: RequireRole<AdminAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let activity = app_state
        .storage
        .get_activity(id)
        .await?
        .ok_or(AppError::NotFound("activity"))?;

    if !app_state.storage.delete_activity(id).await? {
        return Err(AppError::NotFound("activity"));
    }

    app_state
        .storage
        .create_audit_log(InsertAuditLog {
            user_id: gate.user.id,
            action: format!("Deleted activity: {}", activity.name),
            details: Some(json!({ "activityId": id }).to_string()),
        })
        .await?;

    Ok(Json(json!({ "message": "Activity deleted successfully" })))
}

// =============================================================================
//  COMPETITOR PRICING
// =============================================================================

// GET /api/admin/getyourguide/comparison
#[utoipa::path(
    get,
    path = "/api/admin/getyourguide/comparison",
    tag = "Admin",
    responses((status = 200, description = "Own vs competitor pricing", body = Vec<Activity>)),
    security(("session_cookie" = []))
)]
pub async fn price_comparison(
    State(app_state): State<AppState>,
    _gate: RequireRole<AdminAccess>,
) -> Result<Json<Vec<Activity>>, AppError> {
    let activities = app_state.storage.get_activities().await?;
    Ok(Json(activities))
}

// PATCH /api/admin/activities/{id}/getyourguide-price  (superadmin only)
#[utoipa::path(
    patch,
    path = "/api/admin/activities/{id}/getyourguide-price",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Activity id")),
    request_body = UpdateGetYourGuidePricePayload,
    responses(
        (status = 200, description = "Updated activity", body = Activity),
        (status = 403, description = "Not superadmin"),
        (status = 404, description = "Unknown activity")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_getyourguide_price(
    State(app_state): State<AppState>,
    gate: RequireRole<SuperadminAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGetYourGuidePricePayload>,
) -> Result<Json<Activity>, AppError> {
    let activity = app_state
        .storage
        .update_activity_getyourguide_price(id, payload.getyourguide_price)
        .await?
        .ok_or(AppError::NotFound("activity"))?;

    app_state
        .storage
        .create_audit_log(InsertAuditLog {
            user_id: gate.user.id,
            action: "Updated GetYourGuide price for activity".to_string(),
            details: Some(
                json!({
                    "activityId": id,
                    "getyourguidePrice": payload.getyourguide_price
                })
                .to_string(),
            ),
        })
        .await?;

    Ok(Json(activity))
}

// =============================================================================
//  REVIEW MODERATION (admin or above)
// =============================================================================

// GET /api/admin/reviews
#[utoipa::path(
    get,
    path = "/api/admin/reviews",
    tag = "Admin",
    responses((status = 200, description = "All reviews, approved or not", body = Vec<ReviewWithActivity>)),
    security(("session_cookie" = []))
)]
pub async fn list_reviews(
    State(app_state): State<AppState>,
    _gate: RequireRole<AdminAccess>,
) -> Result<Json<Vec<ReviewWithActivity>>, AppError> {
    let reviews = app_state.storage.get_reviews(None, false).await?;
    Ok(Json(reviews))
}

// PATCH /api/admin/reviews/{id}/approval
#[utoipa::path(
    patch,
    path = "/api/admin/reviews/{id}/approval",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Review id")),
    request_body = UpdateReviewApprovalPayload,
    responses(
        (status = 200, description = "Updated review"),
        (status = 404, description = "Unknown review")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_review_approval(
    State(app_state): State<AppState>,
    gate: RequireRole<AdminAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewApprovalPayload>,
) -> Result<impl IntoResponse, AppError> {
    let review = app_state
        .storage
        .update_review_approval(id, payload.approved)
        .await?
        .ok_or(AppError::NotFound("review"))?;

    app_state
        .storage
        .create_audit_log(InsertAuditLog {
            user_id: gate.user.id,
            action: format!(
                "{} review {id}",
                if payload.approved { "Approved" } else { "Unapproved" }
            ),
            details: Some(json!({ "reviewId": id, "approved": payload.approved }).to_string()),
        })
        .await?;

    Ok(Json(review))
}

// =============================================================================
//  AUDIT LOG + WHATSAPP CONTACTS
// =============================================================================

// GET /api/admin/audit-logs  (superadmin only)
#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    tag = "Admin",
    responses((status = 200, description = "Most recent 100 entries", body = Vec<AuditLog>)),
    security(("session_cookie" = []))
)]
pub async fn audit_logs(
    State(app_state): State<AppState>,
    _gate: RequireRole<SuperadminAccess>,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    let logs = app_state.storage.get_audit_logs().await?;
    Ok(Json(logs))
}

// GET /api/admin/whatsapp-contacts
#[utoipa::path(
    get,
    path = "/api/admin/whatsapp-contacts",
    tag = "Admin",
    responses((status = 200, description = "Staff WhatsApp contacts", body = Vec<WhatsAppContact>)),
    security(("session_cookie" = []))
)]
pub async fn whatsapp_contacts(
    State(app_state): State<AppState>,
    _gate: RequireRole<AdminAccess>,
) -> Result<Json<Vec<WhatsAppContact>>, AppError> {
    Ok(Json(app_state.whatsapp.contacts().to_vec()))
}
