//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Message produced by the coordinator for one user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Where a notification is delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}
