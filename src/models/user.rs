//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Library member as held in the store.
///
/// The id collections mirror the reciprocal references kept on books; they are
/// only ever changed by the repository ledger methods so both sides stay in sync.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Every borrow the user ever made, active and returned
    pub borrows: Vec<i64>,
    pub queue_entries: Vec<i64>,
    pub reviews: Vec<i64>,
    pub notifications: Vec<i64>,
}

/// User with lending counters for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDetails {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Borrows not yet returned
    pub active_borrows: usize,
    pub total_borrows: usize,
    pub queue_memberships: usize,
    pub reviews: usize,
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 64, message = "Username must be 3 to 64 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

/// Update user request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 64, message = "Username must be 3 to 64 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}
