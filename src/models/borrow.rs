//! Borrow model and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// How a copy reached the borrower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BorrowOrigin {
    /// Requested by the user at the desk
    Direct,
    /// Assigned by the auto-borrow sweep after a return
    Queue,
}

/// Longest lending period a borrow may be given
pub const MAX_BORROW_DAYS: i64 = 365;

/// Due date of a borrow starting at `from`, or `None` when it is not representable
pub fn due_date(from: DateTime<Utc>, duration_days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(duration_days).and_then(|d| from.checked_add_signed(d))
}

/// One copy of a book handed to one user
#[derive(Debug, Clone)]
pub struct Borrow {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub duration_days: i64,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub origin: BorrowOrigin,
}

impl Borrow {
    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_returned() && self.due_at < now
    }
}

/// Borrow as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowRecord {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub borrowed_at: DateTime<Utc>,
    pub duration_days: i64,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub origin: BorrowOrigin,
    pub is_overdue: bool,
}

impl BorrowRecord {
    pub fn new(borrow: &Borrow, book_title: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: borrow.id,
            user_id: borrow.user_id,
            book_id: borrow.book_id,
            book_title: book_title.to_string(),
            borrowed_at: borrow.borrowed_at,
            duration_days: borrow.duration_days,
            due_at: borrow.due_at,
            returned_at: borrow.returned_at,
            origin: borrow.origin,
            is_overdue: borrow.is_overdue(now),
        }
    }
}

/// Create borrow request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBorrow {
    pub user_id: i64,
    pub book_id: i64,
    /// Defaults to the configured lending period
    #[validate(range(min = 1, max = 365, message = "Duration must be between 1 and 365 days"))]
    pub duration_days: Option<i64>,
}

/// Return borrow request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReturnBorrow {
    /// User performing the return; defaults to the borrower
    pub user_id: Option<i64>,
}
