use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// A bookable tour/experience. The price is stored as a string and treated
// as opaque by the catalog; booking creation parses its leading integer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: String,
    pub currency: String,
    pub image: String,
    pub photos: Vec<String>,
    pub category: String,
    pub is_active: bool,
    pub getyourguide_price: Option<i64>,
    pub availability: Option<String>,
    pub duration: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_currency() -> String {
    "MAD".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityPayload {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Agafay Desert Combo Experience")]
    pub name: String,

    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,

    #[validate(length(min = 1, message = "price is required"))]
    #[schema(example = "450")]
    pub price: String,

    #[serde(default = "default_currency")]
    #[schema(example = "MAD")]
    pub currency: String,

    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,

    #[serde(default)]
    pub photos: Vec<String>,

    #[validate(length(min = 1, message = "category is required"))]
    #[schema(example = "Desert")]
    pub category: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    pub getyourguide_price: Option<i64>,
    pub availability: Option<String>,
    pub duration: Option<String>,
}

// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityPayload {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "price must not be empty"))]
    pub price: Option<String>,
    pub currency: Option<String>,
    pub image: Option<String>,
    pub photos: Option<Vec<String>>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub getyourguide_price: Option<i64>,
    pub availability: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGetYourGuidePricePayload {
    #[schema(example = 600)]
    pub getyourguide_price: i64,
}

// Public rating aggregate over approved reviews.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRating {
    pub average_rating: f64,
    pub total_reviews: i64,
}
