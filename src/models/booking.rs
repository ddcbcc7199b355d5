use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::activity::Activity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    DepositPaid,
    FullyPaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::DepositPaid => "deposit_paid",
            PaymentStatus::FullyPaid => "fully_paid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CashDeposit,
}

// A customer's reservation against an activity. `total_amount` is the price
// snapshot taken at creation time and is never recomputed afterwards.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub activity_id: Uuid,
    pub number_of_people: i32,
    pub preferred_date: NaiveDate,
    pub participant_names: Vec<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub total_amount: String,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub paid_amount: i64,
    pub deposit_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingWithActivity {
    #[serde(flatten)]
    pub booking: Booking,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Activity>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingPayload {
    #[validate(length(min = 1, message = "customerName is required"))]
    #[schema(example = "Marie")]
    pub customer_name: String,

    #[validate(length(min = 1, message = "customerPhone is required"))]
    #[schema(example = "+33612345678")]
    pub customer_phone: String,

    #[validate(email(message = "customerEmail is invalid"))]
    pub customer_email: Option<String>,

    pub activity_id: Uuid,

    #[validate(range(min = 1, message = "numberOfPeople must be at least 1"))]
    #[schema(example = 2)]
    pub number_of_people: i32,

    #[schema(value_type = String, format = Date, example = "2025-06-01")]
    pub preferred_date: NaiveDate,

    #[serde(default)]
    pub participant_names: Vec<String>,

    pub notes: Option<String>,
}

// Computed by the booking service, consumed by storage.
#[derive(Debug, Clone)]
pub struct InsertBooking {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub activity_id: Uuid,
    pub number_of_people: i32,
    pub preferred_date: NaiveDate,
    pub participant_names: Vec<String>,
    pub notes: Option<String>,
    pub total_amount: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatusPayload {
    pub status: BookingStatus,
}

// Payment fields are written as given. The admin client computes the
// full/deposit/balance amounts; the server does not reconcile paidAmount
// against totalAmount.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingPaymentPayload {
    pub payment_status: PaymentStatus,
    pub paid_amount: i64,
    pub payment_method: PaymentMethod,
    pub deposit_amount: Option<i64>,
}
