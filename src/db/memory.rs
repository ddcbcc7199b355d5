use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
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
            Booking, BookingStatus, BookingWithActivity, InsertBooking, PaymentStatus,
            UpdateBookingPaymentPayload,
        },
        review::{CreateReviewPayload, Review, ReviewWithActivity},
    },
};

#[derive(Default)]
struct MemData {
    users: Vec<User>,
    activities: Vec<Activity>,
    bookings: Vec<Booking>,
    audit_logs: Vec<AuditLog>,
    reviews: Vec<Review>,
}

// In-memory fallback store. Selected at startup when no database is
// configured or reachable; everything is lost on restart. Also the
// backend the integration tests run against.
#[derive(Default)]
pub struct MemStorage {
    data: RwLock<MemData>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let data = self.data.read().unwrap();
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let data = self.data.read().unwrap();
        Ok(data.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: InsertUser) -> Result<User, AppError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        self.data.write().unwrap().users.push(user.clone());
        Ok(user)
    }

    async fn get_activities(&self) -> Result<Vec<Activity>, AppError> {
        let data = self.data.read().unwrap();
        Ok(data
            .activities
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect())
    }

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>, AppError> {
        let data = self.data.read().unwrap();
        Ok(data.activities.iter().find(|a| a.id == id).cloned())
    }

    async fn count_activities(&self) -> Result<i64, AppError> {
        let data = self.data.read().unwrap();
        Ok(data.activities.len() as i64)
    }

    async fn create_activity(
        &self,
        activity: CreateActivityPayload,
    ) -> Result<Activity, AppError> {
        let now = Utc::now();
        let activity = Activity {
            id: Uuid::new_v4(),
            name: activity.name,
            description: activity.description,
            price: activity.price,
            currency: activity.currency,
            image: activity.image,
            photos: activity.photos,
            category: activity.category,
            is_active: activity.is_active,
            getyourguide_price: activity.getyourguide_price,
            availability: activity.availability,
            duration: activity.duration,
            created_at: now,
            updated_at: now,
        };
        self.data.write().unwrap().activities.push(activity.clone());
        Ok(activity)
    }

    async fn update_activity(
        &self,
        id: Uuid,
        update: UpdateActivityPayload,
    ) -> Result<Option<Activity>, AppError> {
        let mut data = self.data.write().unwrap();
        let Some(activity) = data.activities.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            activity.name = name;
        }
        if let Some(description) = update.description {
            activity.description = description;
        }
        if let Some(price) = update.price {
            activity.price = price;
        }
        if let Some(currency) = update.currency {
            activity.currency = currency;
        }
        if let Some(image) = update.image {
            activity.image = image;
        }
        if let Some(photos) = update.photos {
            activity.photos = photos;
        }
        if let Some(category) = update.category {
            activity.category = category;
        }
        if let Some(is_active) = update.is_active {
            activity.is_active = is_active;
        }
        if let Some(price) = update.getyourguide_price {
            activity.getyourguide_price = Some(price);
        }
        if let Some(availability) = update.availability {
            activity.availability = Some(availability);
        }
        if let Some(duration) = update.duration {
            activity.duration = Some(duration);
        }
        activity.updated_at = Utc::now();

        Ok(Some(activity.clone()))
    }

    async fn delete_activity(&self, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.data.write().unwrap();
        let before = data.activities.len();
        data.activities.retain(|a| a.id != id);
        Ok(data.activities.len() < before)
    }

    async fn update_activity_getyourguide_price(
        &self,
        id: Uuid,
        price: i64,
    ) -> Result<Option<Activity>, AppError> {
        let mut data = self.data.write().unwrap();
        let Some(activity) = data.activities.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        activity.getyourguide_price = Some(price);
        activity.updated_at = Utc::now();
        Ok(Some(activity.clone()))
    }

    async fn get_bookings(&self) -> Result<Vec<BookingWithActivity>, AppError> {
        let data = self.data.read().unwrap();
        let mut bookings: Vec<BookingWithActivity> = data
            .bookings
            .iter()
            .map(|booking| BookingWithActivity {
                booking: booking.clone(),
                activity: data
                    .activities
                    .iter()
                    .find(|a| a.id == booking.activity_id)
                    .cloned(),
            })
            .collect();
        bookings.sort_by(|a, b| b.booking.created_at.cmp(&a.booking.created_at));
        Ok(bookings)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<BookingWithActivity>, AppError> {
        let data = self.data.read().unwrap();
        let Some(booking) = data.bookings.iter().find(|b| b.id == id).cloned() else {
            return Ok(None);
        };
        let activity = data
            .activities
            .iter()
            .find(|a| a.id == booking.activity_id)
            .cloned();
        Ok(Some(BookingWithActivity { booking, activity }))
    }

    async fn create_booking(&self, booking: InsertBooking) -> Result<Booking, AppError> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            customer_name: booking.customer_name,
            customer_phone: booking.customer_phone,
            customer_email: booking.customer_email,
            activity_id: booking.activity_id,
            number_of_people: booking.number_of_people,
            preferred_date: booking.preferred_date,
            participant_names: booking.participant_names,
            notes: booking.notes,
            status: BookingStatus::Pending,
            total_amount: booking.total_amount,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            paid_amount: 0,
            deposit_amount: None,
            created_at: now,
            updated_at: now,
        };
        self.data.write().unwrap().bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>, AppError> {
        let mut data = self.data.write().unwrap();
        let Some(booking) = data.bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        booking.status = status;
        booking.updated_at = Utc::now();
        Ok(Some(booking.clone()))
    }

    async fn update_booking_payment(
        &self,
        id: Uuid,
        payment: UpdateBookingPaymentPayload,
    ) -> Result<Option<Booking>, AppError> {
        let mut data = self.data.write().unwrap();
        let Some(booking) = data.bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        booking.payment_status = payment.payment_status;
        booking.paid_amount = payment.paid_amount;
        booking.payment_method = Some(payment.payment_method);
        booking.deposit_amount = payment.deposit_amount;
        booking.updated_at = Utc::now();
        Ok(Some(booking.clone()))
    }

    async fn create_audit_log(&self, log: InsertAuditLog) -> Result<AuditLog, AppError> {
        let log = AuditLog {
            id: Uuid::new_v4(),
            user_id: log.user_id,
            action: log.action,
            details: log.details,
            created_at: Utc::now(),
        };
        self.data.write().unwrap().audit_logs.push(log.clone());
        Ok(log)
    }

    async fn get_audit_logs(&self) -> Result<Vec<AuditLog>, AppError> {
        let data = self.data.read().unwrap();
        let mut logs = data.audit_logs.clone();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        logs.truncate(100);
        Ok(logs)
    }

    async fn get_reviews(
        &self,
        activity_id: Option<Uuid>,
        approved_only: bool,
    ) -> Result<Vec<ReviewWithActivity>, AppError> {
        let data = self.data.read().unwrap();
        let mut reviews: Vec<ReviewWithActivity> = data
            .reviews
            .iter()
            .filter(|r| activity_id.is_none_or(|id| r.activity_id == id))
            .filter(|r| !approved_only || r.approved)
            .map(|review| ReviewWithActivity {
                review: review.clone(),
                activity: data
                    .activities
                    .iter()
                    .find(|a| a.id == review.activity_id)
                    .cloned(),
            })
            .collect();
        reviews.sort_by(|a, b| b.review.created_at.cmp(&a.review.created_at));
        Ok(reviews)
    }

    async fn create_review(&self, review: CreateReviewPayload) -> Result<Review, AppError> {
        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            customer_name: review.customer_name,
            customer_email: review.customer_email,
            activity_id: review.activity_id,
            rating: review.rating,
            title: review.title,
            comment: review.comment,
            verified: false,
            approved: false,
            created_at: now,
            updated_at: now,
        };
        self.data.write().unwrap().reviews.push(review.clone());
        Ok(review)
    }

    async fn update_review_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<Option<Review>, AppError> {
        let mut data = self.data.write().unwrap();
        let Some(review) = data.reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        review.approved = approved;
        review.updated_at = Utc::now();
        Ok(Some(review.clone()))
    }

    async fn get_activity_rating(&self, activity_id: Uuid) -> Result<ActivityRating, AppError> {
        let data = self.data.read().unwrap();
        let ratings: Vec<i32> = data
            .reviews
            .iter()
            .filter(|r| r.activity_id == activity_id && r.approved)
            .map(|r| r.rating)
            .collect();

        if ratings.is_empty() {
            return Ok(ActivityRating {
                average_rating: 0.0,
                total_reviews: 0,
            });
        }

        let total = ratings.len() as i64;
        let average = ratings.iter().map(|r| *r as f64).sum::<f64>() / total as f64;
        Ok(ActivityRating {
            average_rating: average,
            total_reviews: total,
        })
    }

    async fn earnings_analytics(&self) -> Result<EarningsAnalytics, AppError> {
        let (previous_start, current_start) = month_bounds(Utc::now());
        let data = self.data.read().unwrap();

        let paid = |b: &&Booking| {
            matches!(
                b.payment_status,
                PaymentStatus::DepositPaid | PaymentStatus::FullyPaid
            )
        };

        let current_month: i64 = data
            .bookings
            .iter()
            .filter(|b| b.created_at >= current_start)
            .filter(paid)
            .map(|b| b.paid_amount)
            .sum();

        let last_month: i64 = data
            .bookings
            .iter()
            .filter(|b| b.created_at >= previous_start && b.created_at < current_start)
            .filter(paid)
            .map(|b| b.paid_amount)
            .sum();

        Ok(EarningsAnalytics {
            current_month,
            last_month,
            currency: "MAD".to_string(),
        })
    }

    async fn booking_analytics(&self) -> Result<BookingAnalytics, AppError> {
        let data = self.data.read().unwrap();
        let count =
            |status: BookingStatus| data.bookings.iter().filter(|b| b.status == status).count() as i64;

        Ok(BookingAnalytics {
            total: data.bookings.len() as i64,
            pending: count(BookingStatus::Pending),
            confirmed: count(BookingStatus::Confirmed),
            cancelled: count(BookingStatus::Cancelled),
            completed: count(BookingStatus::Completed),
        })
    }

    async fn activity_analytics(&self) -> Result<Vec<ActivityBookingCount>, AppError> {
        let data = self.data.read().unwrap();
        Ok(data
            .activities
            .iter()
            .filter(|a| a.is_active)
            .map(|activity| {
                let booking_count = data
                    .bookings
                    .iter()
                    .filter(|b| b.activity_id == activity.id)
                    .count() as i64;
                ActivityBookingCount {
                    activity: activity.clone(),
                    booking_count,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_payload(activity_id: Uuid, rating: i32) -> CreateReviewPayload {
        CreateReviewPayload {
            customer_name: "Marie".to_string(),
            customer_email: "marie@example.com".to_string(),
            activity_id,
            rating,
            title: "Great trip".to_string(),
            comment: "Loved every minute of it.".to_string(),
        }
    }

    #[tokio::test]
    async fn rating_counts_only_approved_reviews() {
        let storage = MemStorage::new();
        let activity_id = Uuid::new_v4();

        let first = storage
            .create_review(review_payload(activity_id, 5))
            .await
            .unwrap();
        storage
            .create_review(review_payload(activity_id, 1))
            .await
            .unwrap();

        // Nothing approved yet: the aggregate is zero.
        let rating = storage.get_activity_rating(activity_id).await.unwrap();
        assert_eq!(rating.total_reviews, 0);
        assert_eq!(rating.average_rating, 0.0);

        storage
            .update_review_approval(first.id, true)
            .await
            .unwrap();

        let rating = storage.get_activity_rating(activity_id).await.unwrap();
        assert_eq!(rating.total_reviews, 1);
        assert_eq!(rating.average_rating, 5.0);
    }

    #[tokio::test]
    async fn public_review_listing_excludes_unapproved() {
        let storage = MemStorage::new();
        let activity_id = Uuid::new_v4();
        let review = storage
            .create_review(review_payload(activity_id, 4))
            .await
            .unwrap();

        assert!(storage.get_reviews(None, true).await.unwrap().is_empty());
        assert_eq!(storage.get_reviews(None, false).await.unwrap().len(), 1);

        storage
            .update_review_approval(review.id, true)
            .await
            .unwrap();
        assert_eq!(storage.get_reviews(None, true).await.unwrap().len(), 1);
    }
}
