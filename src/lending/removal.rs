//! Removing books and users from the ledger

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    repository::Store,
};

/// Remove a book from the catalog.
///
/// Refused while any copy is lent out. Users waiting for it lose their queue
/// entry and are told so; the returned ids are those notifications.
pub fn retire_book(store: &mut Store, book_id: i64, now: DateTime<Utc>) -> AppResult<Vec<i64>> {
    let outstanding = store.outstanding_copies(book_id)?;
    let book = store.book(book_id)?;
    if outstanding > 0 {
        return Err(AppError::Conflict(format!(
            "Book '{}' still has {} copies lent out",
            book.title, outstanding
        )));
    }

    let title = book.title.clone();
    let waiting: Vec<i64> = store
        .queue_of(book_id)?
        .iter()
        .map(|entry| entry.user_id)
        .collect();

    let mut notifications = Vec::with_capacity(waiting.len());
    for user_id in waiting {
        notifications.push(store.insert_notification(
            user_id,
            "Reservation cancelled",
            format!("Book '{}' was removed from the catalog.", title),
            now,
        )?);
    }
    store.remove_book(book_id)?;

    tracing::info!(book_id, cancelled = notifications.len(), "Book removed from catalog");
    Ok(notifications)
}

/// Delete a user account; refused while the user still holds a book
pub fn close_account(store: &mut Store, user_id: i64) -> AppResult<()> {
    let active = store.active_borrow_count(user_id)?;
    if active > 0 {
        return Err(AppError::Conflict(format!(
            "User {} still has {} books to return",
            user_id, active
        )));
    }
    store.remove_user(user_id)?;

    tracing::info!(user_id, "Account closed");
    Ok(())
}
