//! Auto-borrow sweep: hand shelf copies to queued users

use chrono::{DateTime, Utc};

use super::borrow_book;
use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::BorrowOrigin,
    repository::Store,
};

/// What a sweep did to one book's queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub book_id: i64,
    /// Borrows created for queued users, in queue order
    pub assigned: Vec<i64>,
    /// Users whose reservation was consumed without a copy
    pub forfeited: Vec<i64>,
    /// Notifications recorded for assigned and forfeited users
    pub notifications: Vec<i64>,
}

impl SweepReport {
    fn new(book_id: i64) -> Self {
        Self {
            book_id,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty() && self.forfeited.is_empty()
    }
}

/// Assign shelf copies of a book to its queue, earliest entry first.
///
/// Runs until the shelf or the queue is empty. A queued user who cannot borrow
/// (limit reached, already holding the book) loses the reservation and the sweep
/// moves on to the next entry. Running it again on the same state does nothing.
pub fn sweep(
    store: &mut Store,
    rules: &LendingConfig,
    book_id: i64,
    now: DateTime<Utc>,
) -> AppResult<SweepReport> {
    let mut report = SweepReport::new(book_id);

    loop {
        let book = store.book(book_id)?;
        if book.available_copies == 0 {
            break;
        }
        let Some(&entry_id) = book.queue.first() else {
            break;
        };
        let title = book.title.clone();
        let user_id = store.queue_entry(entry_id)?.user_id;

        match borrow_book(
            store,
            rules,
            user_id,
            book_id,
            rules.auto_borrow_days,
            BorrowOrigin::Queue,
            now,
        ) {
            Ok(borrow_id) => {
                let due_at = store.borrow(borrow_id)?.due_at;
                let notification = store.insert_notification(
                    user_id,
                    "Reserved book borrowed",
                    format!(
                        "Book '{}' is available and has been borrowed for you. Please return it by {}.",
                        title,
                        due_at.format("%Y-%m-%d")
                    ),
                    now,
                )?;
                tracing::info!(book_id, user_id, borrow_id, "Queued reservation fulfilled");
                report.assigned.push(borrow_id);
                report.notifications.push(notification);
            }
            Err(AppError::Conflict(reason)) => {
                store.remove_queue_entry(entry_id)?;
                let notification = store.insert_notification(
                    user_id,
                    "Reservation released",
                    format!(
                        "Your reservation for '{}' could not be fulfilled and was released: {}",
                        title, reason
                    ),
                    now,
                )?;
                tracing::warn!(book_id, user_id, entry_id, %reason, "Queued reservation forfeited");
                report.forfeited.push(user_id);
                report.notifications.push(notification);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}
