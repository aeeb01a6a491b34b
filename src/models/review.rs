//! Review model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    /// 1 to 5
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create review request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReview {
    pub user_id: i64,
    pub book_id: i64,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(length(max = 4000, message = "Comment is too long"))]
    pub comment: Option<String>,
}

/// Update review request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateReview {
    /// Author of the review
    pub user_id: i64,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<u8>,
    #[validate(length(max = 4000, message = "Comment is too long"))]
    pub comment: Option<String>,
}
