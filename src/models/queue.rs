//! Reservation queue model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A user waiting for a copy of a book
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub joined_at: DateTime<Utc>,
}

/// Queue entry as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueMembership {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub book_id: i64,
    pub book_title: String,
    pub joined_at: DateTime<Utc>,
    /// 1 for the head of the queue
    pub position: usize,
}

/// Join queue request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct JoinQueue {
    pub user_id: i64,
}

/// Identifies the acting user on ownership-checked operations
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ActingUser {
    pub user_id: Option<i64>,
}
