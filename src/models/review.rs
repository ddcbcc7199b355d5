use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::activity::Activity;

// Reviews are created unapproved; only approved ones are listed publicly
// and feed the rating aggregate.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub activity_id: Uuid,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub verified: bool,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewWithActivity {
    #[serde(flatten)]
    pub review: Review,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Activity>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewPayload {
    #[validate(length(min = 1, message = "customerName is required"))]
    pub customer_name: String,

    #[validate(email(message = "customerEmail is invalid"))]
    pub customer_email: String,

    pub activity_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    #[schema(example = 5)]
    pub rating: i32,

    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "comment is required"))]
    pub comment: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReviewApprovalPayload {
    pub approved: bool,
}
