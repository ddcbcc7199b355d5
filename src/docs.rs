use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

use crate::{handlers, models, services};

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::current_user,

        // --- Catalog ---
        handlers::activities::list,
        handlers::activities::get_one,
        handlers::activities::rating,

        // --- Bookings ---
        handlers::bookings::create,

        // --- Reviews ---
        handlers::reviews::list,
        handlers::reviews::create,

        // --- Admin ---
        handlers::admin::list_bookings,
        handlers::admin::update_booking_status,
        handlers::admin::update_booking_payment,
        handlers::admin::create_activity,
        handlers::admin::update_activity,
        handlers::admin::delete_activity,
        handlers::admin::price_comparison,
        handlers::admin::update_getyourguide_price,
        handlers::admin::list_reviews,
        handlers::admin::update_review_approval,
        handlers::admin::audit_logs,
        handlers::admin::whatsapp_contacts,

        // --- Analytics ---
        handlers::analytics::earnings,
        handlers::analytics::bookings,
        handlers::analytics::activities,
        handlers::analytics::system_health,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::SessionUser,
            models::auth::LoginPayload,
            models::auth::LoginResponse,

            // --- Catalog ---
            models::activity::Activity,
            models::activity::CreateActivityPayload,
            models::activity::UpdateActivityPayload,
            models::activity::UpdateGetYourGuidePricePayload,
            models::activity::ActivityRating,

            // --- Bookings ---
            models::booking::BookingStatus,
            models::booking::PaymentStatus,
            models::booking::PaymentMethod,
            models::booking::Booking,
            models::booking::BookingWithActivity,
            models::booking::CreateBookingPayload,
            models::booking::UpdateBookingStatusPayload,
            models::booking::UpdateBookingPaymentPayload,

            // --- Reviews ---
            models::review::Review,
            models::review::ReviewWithActivity,
            models::review::CreateReviewPayload,
            models::review::UpdateReviewApprovalPayload,

            // --- Audit ---
            models::audit::AuditLog,

            // --- Analytics ---
            models::analytics::EarningsAnalytics,
            models::analytics::BookingAnalytics,
            models::analytics::ActivityBookingCount,
            models::analytics::DatabaseHealth,
            models::analytics::ServerHealth,
            models::analytics::SystemHealth,
            models::analytics::HealthResponse,

            // --- WhatsApp ---
            services::whatsapp::WhatsAppContact,
            services::whatsapp::WhatsAppLink,
        )
    ),
    tags(
        (name = "Health", description = "Deployment probes"),
        (name = "Auth", description = "Session login and logout"),
        (name = "Activities", description = "Public activity catalog"),
        (name = "Bookings", description = "Customer booking requests"),
        (name = "Reviews", description = "Customer reviews and moderation"),
        (name = "Admin", description = "Role-gated management API"),
        (name = "Analytics", description = "Aggregations for the dashboards")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                crate::services::sessions::SESSION_COOKIE,
            ))),
        );
    }
}
