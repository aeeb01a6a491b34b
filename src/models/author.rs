//! Author model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Ids of the books credited to this author
    pub books: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 256, message = "Name must not be empty"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 256, message = "Name must not be empty"))]
    pub name: Option<String>,
}
