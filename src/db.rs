pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppConfig,
    models::{
        activity::{Activity, ActivityRating, CreateActivityPayload, UpdateActivityPayload},
        analytics::{ActivityBookingCount, BookingAnalytics, EarningsAnalytics},
        audit::{AuditLog, InsertAuditLog},
        auth::{InsertUser, Role, User},
        booking::{
            Booking, BookingStatus, BookingWithActivity, InsertBooking,
            UpdateBookingPaymentPayload,
        },
        review::{CreateReviewPayload, Review, ReviewWithActivity},
    },
};

/// The storage interface over the five collections (users, activities,
/// bookings, audit logs, reviews). Two implementations exist: the
/// persistent [`postgres::PgStorage`] and the [`memory::MemStorage`]
/// fallback. The backend is selected once at startup, never per-call.
#[async_trait]
pub trait Storage: Send + Sync {
    fn backend_name(&self) -> &'static str;
    async fn ping(&self) -> Result<(), AppError>;

    // Users
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn create_user(&self, user: InsertUser) -> Result<User, AppError>;

    // Activities
    async fn get_activities(&self) -> Result<Vec<Activity>, AppError>;
    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>, AppError>;
    async fn count_activities(&self) -> Result<i64, AppError>;
    async fn create_activity(&self, activity: CreateActivityPayload) -> Result<Activity, AppError>;
    async fn update_activity(
        &self,
        id: Uuid,
        update: UpdateActivityPayload,
    ) -> Result<Option<Activity>, AppError>;
    async fn delete_activity(&self, id: Uuid) -> Result<bool, AppError>;
    async fn update_activity_getyourguide_price(
        &self,
        id: Uuid,
        price: i64,
    ) -> Result<Option<Activity>, AppError>;

    // Bookings
    async fn get_bookings(&self) -> Result<Vec<BookingWithActivity>, AppError>;
    async fn get_booking(&self, id: Uuid) -> Result<Option<BookingWithActivity>, AppError>;
    async fn create_booking(&self, booking: InsertBooking) -> Result<Booking, AppError>;
    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>, AppError>;
    async fn update_booking_payment(
        &self,
        id: Uuid,
        payment: UpdateBookingPaymentPayload,
    ) -> Result<Option<Booking>, AppError>;

    // Audit log (append-only)
    async fn create_audit_log(&self, log: InsertAuditLog) -> Result<AuditLog, AppError>;
    async fn get_audit_logs(&self) -> Result<Vec<AuditLog>, AppError>;

    // Reviews
    async fn get_reviews(
        &self,
        activity_id: Option<Uuid>,
        approved_only: bool,
    ) -> Result<Vec<ReviewWithActivity>, AppError>;
    async fn create_review(&self, review: CreateReviewPayload) -> Result<Review, AppError>;
    async fn update_review_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<Option<Review>, AppError>;
    async fn get_activity_rating(&self, activity_id: Uuid) -> Result<ActivityRating, AppError>;

    // Analytics (real aggregations, no fabricated metrics)
    async fn earnings_analytics(&self) -> Result<EarningsAnalytics, AppError>;
    async fn booking_analytics(&self) -> Result<BookingAnalytics, AppError>;
    async fn activity_analytics(&self) -> Result<Vec<ActivityBookingCount>, AppError>;
}

/// First instants of the previous and the current calendar month, used by
/// the earnings aggregation in both backends.
pub(crate) fn month_bounds(
    now: chrono::DateTime<chrono::Utc>,
) -> (chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>) {
    use chrono::{Datelike, TimeZone, Utc};

    let current = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let (prev_year, prev_month) = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };
    let previous = Utc
        .with_ymd_and_hms(prev_year, prev_month, 1, 0, 0, 0)
        .single()
        .unwrap_or(current);
    (previous, current)
}

async fn hash_password(password: String) -> Result<String, AppError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("hashing task failed: {e}"))??;
    Ok(hash)
}

/// Idempotent seeding: the three staff accounts always, the production
/// catalog only when the activities collection is empty.
pub async fn seed_initial_data(
    storage: &dyn Storage,
    config: &AppConfig,
) -> Result<(), AppError> {
    let staff = [
        ("nadia", config.superadmin_password.clone(), Role::Superadmin),
        ("ahmed", config.admin_password.clone(), Role::Admin),
        ("yahia", config.admin_password.clone(), Role::Admin),
    ];

    for (username, password, role) in staff {
        if storage.get_user_by_username(username).await?.is_none() {
            let password_hash = hash_password(password).await?;
            storage
                .create_user(InsertUser {
                    username: username.to_string(),
                    password_hash,
                    role,
                })
                .await?;
            tracing::info!("created staff user: {username}");
        }
    }

    if storage.count_activities().await? == 0 {
        for activity in seed_activities() {
            storage.create_activity(activity).await?;
        }
        tracing::info!("seeded initial activity catalog");
    }

    Ok(())
}

fn seed_activities() -> Vec<CreateActivityPayload> {
    let activity = |name: &str,
                    description: &str,
                    price: &str,
                    image: &str,
                    category: &str,
                    getyourguide_price: i64,
                    availability: &str,
                    duration: Option<&str>| CreateActivityPayload {
        name: name.to_string(),
        description: description.to_string(),
        price: price.to_string(),
        currency: "MAD".to_string(),
        image: image.to_string(),
        photos: Vec::new(),
        category: category.to_string(),
        is_active: true,
        getyourguide_price: Some(getyourguide_price),
        availability: Some(availability.to_string()),
        duration: duration.map(|d| d.to_string()),
    };

    vec![
        activity(
            "Hot Air Balloon Ride Marrakech",
            "Experience breathtaking sunrise views over Marrakech and the Atlas Mountains \
             from a hot air balloon. Includes hotel pickup, traditional Berber breakfast, \
             and flight certificate.",
            "1100",
            "/images/balloon-ride.jpg",
            "Adventure",
            1400,
            "Daily at sunrise",
            Some("4 hours"),
        ),
        activity(
            "Agafay Desert Combo Experience",
            "Full-day desert adventure combining camel riding, quad biking, and \
             traditional dinner under the stars in the Agafay Desert near Marrakech.",
            "450",
            "/images/agafay-combo.jpg",
            "Desert",
            600,
            "Daily",
            Some("8 hours"),
        ),
        activity(
            "Essaouira Day Trip",
            "Discover the coastal charm of Essaouira, the \"Windy City\" with its \
             Portuguese ramparts, blue fishing boats, and authentic seafood.",
            "200",
            "/images/essaouira-day-trip.jpg",
            "Cultural",
            300,
            "Daily",
            Some("10 hours"),
        ),
        activity(
            "Ouzoud Waterfalls Day Trip",
            "Visit Morocco's highest waterfalls, swim in natural pools, enjoy lunch by \
             the cascades, and spot Barbary apes in their natural habitat.",
            "200",
            "/images/ouzoud-waterfalls.jpg",
            "Nature",
            280,
            "Daily",
            None,
        ),
        activity(
            "Ourika Valley Day Trip",
            "Explore traditional Berber villages, terraced fields, and stunning Atlas \
             Mountain landscapes in the beautiful Ourika Valley.",
            "150",
            "/images/ourika-valley.jpg",
            "Cultural",
            220,
            "Daily",
            Some("6 hours"),
        ),
    ]
}
