use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Storage, month_bounds},
    models::{
        activity::{Activity, ActivityRating, CreateActivityPayload, UpdateActivityPayload},
        analytics::{ActivityBookingCount, BookingAnalytics, EarningsAnalytics},
        audit::{AuditLog, InsertAuditLog},
        auth::{InsertUser, User},
        booking::{
            Booking, BookingStatus, BookingWithActivity, InsertBooking,
            UpdateBookingPaymentPayload,
        },
        review::{CreateReviewPayload, Review, ReviewWithActivity},
    },
};

// The persistent store. Queries use the runtime-checked sqlx API; the
// schema lives in migrations/ and is applied on connect.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        sqlx::migrate!().run(&pool).await?;
        tracing::info!("database migrations applied");

        Ok(Self { pool })
    }

    async fn activities_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Activity>, AppError> {
        let activities =
            sqlx::query_as::<_, Activity>("SELECT * FROM activities WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(activities.into_iter().map(|a| (a.id, a)).collect())
    }
}

#[async_trait]
impl Storage for PgStorage {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: InsertUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_activities(&self) -> Result<Vec<Activity>, AppError> {
        let activities = sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE is_active = TRUE ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>, AppError> {
        let activity = sqlx::query_as::<_, Activity>("SELECT * FROM activities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(activity)
    }

    async fn count_activities(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activities")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_activity(
        &self,
        activity: CreateActivityPayload,
    ) -> Result<Activity, AppError> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities
                (name, description, price, currency, image, photos, category,
                 is_active, getyourguide_price, availability, duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&activity.name)
        .bind(&activity.description)
        .bind(&activity.price)
        .bind(&activity.currency)
        .bind(&activity.image)
        .bind(&activity.photos)
        .bind(&activity.category)
        .bind(activity.is_active)
        .bind(activity.getyourguide_price)
        .bind(&activity.availability)
        .bind(&activity.duration)
        .fetch_one(&self.pool)
        .await?;
        Ok(activity)
    }

    async fn update_activity(
        &self,
        id: Uuid,
        update: UpdateActivityPayload,
    ) -> Result<Option<Activity>, AppError> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            UPDATE activities SET
                name               = COALESCE($2, name),
                description        = COALESCE($3, description),
                price              = COALESCE($4, price),
                currency           = COALESCE($5, currency),
                image              = COALESCE($6, image),
                photos             = COALESCE($7, photos),
                category           = COALESCE($8, category),
                is_active          = COALESCE($9, is_active),
                getyourguide_price = COALESCE($10, getyourguide_price),
                availability       = COALESCE($11, availability),
                duration           = COALESCE($12, duration),
                updated_at         = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.price)
        .bind(&update.currency)
        .bind(&update.image)
        .bind(&update.photos)
        .bind(&update.category)
        .bind(update.is_active)
        .bind(update.getyourguide_price)
        .bind(&update.availability)
        .bind(&update.duration)
        .fetch_optional(&self.pool)
        .await?;
        Ok(activity)
    }

    async fn delete_activity(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_activity_getyourguide_price(
        &self,
        id: Uuid,
        price: i64,
    ) -> Result<Option<Activity>, AppError> {
        let activity = sqlx::query_as::<_, Activity>(
            "UPDATE activities SET getyourguide_price = $2, updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(price)
        .fetch_optional(&self.pool)
        .await?;
        Ok(activity)
    }

    async fn get_bookings(&self) -> Result<Vec<BookingWithActivity>, AppError> {
        let bookings =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        let mut ids: Vec<Uuid> = bookings.iter().map(|b| b.activity_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let activities = self.activities_by_ids(&ids).await?;

        Ok(bookings
            .into_iter()
            .map(|booking| {
                let activity = activities.get(&booking.activity_id).cloned();
                BookingWithActivity { booking, activity }
            })
            .collect())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<BookingWithActivity>, AppError> {
        let Some(booking) =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let activity = self.get_activity(booking.activity_id).await?;
        Ok(Some(BookingWithActivity { booking, activity }))
    }

    async fn create_booking(&self, booking: InsertBooking) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings
                (customer_name, customer_phone, customer_email, activity_id,
                 number_of_people, preferred_date, participant_names, notes, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&booking.customer_name)
        .bind(&booking.customer_phone)
        .bind(&booking.customer_email)
        .bind(booking.activity_id)
        .bind(booking.number_of_people)
        .bind(booking.preferred_date)
        .bind(&booking.participant_names)
        .bind(&booking.notes)
        .bind(&booking.total_amount)
        .fetch_one(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn update_booking_payment(
        &self,
        id: Uuid,
        payment: UpdateBookingPaymentPayload,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET
                payment_status = $2,
                paid_amount    = $3,
                payment_method = $4,
                deposit_amount = $5,
                updated_at     = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment.payment_status)
        .bind(payment.paid_amount)
        .bind(payment.payment_method)
        .bind(payment.deposit_amount)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn create_audit_log(&self, log: InsertAuditLog) -> Result<AuditLog, AppError> {
        let log = sqlx::query_as::<_, AuditLog>(
            "INSERT INTO audit_logs (user_id, action, details) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(log.user_id)
        .bind(&log.action)
        .bind(&log.details)
        .fetch_one(&self.pool)
        .await?;
        Ok(log)
    }

    async fn get_audit_logs(&self) -> Result<Vec<AuditLog>, AppError> {
        let logs = sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs ORDER BY created_at DESC LIMIT 100",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    async fn get_reviews(
        &self,
        activity_id: Option<Uuid>,
        approved_only: bool,
    ) -> Result<Vec<ReviewWithActivity>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE ($1::uuid IS NULL OR activity_id = $1)
              AND (NOT $2 OR approved)
            ORDER BY created_at DESC
            "#,
        )
        .bind(activity_id)
        .bind(approved_only)
        .fetch_all(&self.pool)
        .await?;

        let mut ids: Vec<Uuid> = reviews.iter().map(|r| r.activity_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let activities = self.activities_by_ids(&ids).await?;

        Ok(reviews
            .into_iter()
            .map(|review| {
                let activity = activities.get(&review.activity_id).cloned();
                ReviewWithActivity { review, activity }
            })
            .collect())
    }

    async fn create_review(&self, review: CreateReviewPayload) -> Result<Review, AppError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews
                (customer_name, customer_email, activity_id, rating, title, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&review.customer_name)
        .bind(&review.customer_email)
        .bind(review.activity_id)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }

    async fn update_review_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<Option<Review>, AppError> {
        let review = sqlx::query_as::<_, Review>(
            "UPDATE reviews SET approved = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn get_activity_rating(&self, activity_id: Uuid) -> Result<ActivityRating, AppError> {
        let (average, total) = sqlx::query_as::<_, (Option<f64>, i64)>(
            "SELECT AVG(rating)::float8, COUNT(*) FROM reviews \
             WHERE activity_id = $1 AND approved",
        )
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ActivityRating {
            average_rating: average.unwrap_or(0.0),
            total_reviews: total,
        })
    }

    async fn earnings_analytics(&self) -> Result<EarningsAnalytics, AppError> {
        let (previous_start, current_start) = month_bounds(Utc::now());

        let current_month = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(paid_amount), 0)::BIGINT FROM bookings \
             WHERE created_at >= $1 \
               AND payment_status IN ('deposit_paid', 'fully_paid')",
        )
        .bind(current_start)
        .fetch_one(&self.pool)
        .await?;

        let last_month = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(paid_amount), 0)::BIGINT FROM bookings \
             WHERE created_at >= $1 AND created_at < $2 \
               AND payment_status IN ('deposit_paid', 'fully_paid')",
        )
        .bind(previous_start)
        .bind(current_start)
        .fetch_one(&self.pool)
        .await?;

        Ok(EarningsAnalytics {
            current_month,
            last_month,
            currency: "MAD".to_string(),
        })
    }

    async fn booking_analytics(&self) -> Result<BookingAnalytics, AppError> {
        let (total, pending, confirmed, cancelled, completed) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE status = 'pending'),
                    COUNT(*) FILTER (WHERE status = 'confirmed'),
                    COUNT(*) FILTER (WHERE status = 'cancelled'),
                    COUNT(*) FILTER (WHERE status = 'completed')
                FROM bookings
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(BookingAnalytics {
            total,
            pending,
            confirmed,
            cancelled,
            completed,
        })
    }

    async fn activity_analytics(&self) -> Result<Vec<ActivityBookingCount>, AppError> {
        let counts: HashMap<Uuid, i64> = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT activity_id, COUNT(*) FROM bookings GROUP BY activity_id",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .collect();

        let activities = self.get_activities().await?;
        Ok(activities
            .into_iter()
            .map(|activity| {
                let booking_count = counts.get(&activity.id).copied().unwrap_or(0);
                ActivityBookingCount {
                    activity,
                    booking_count,
                }
            })
            .collect())
    }
}
