//! Joining and leaving reservation queues

use chrono::{DateTime, Utc};

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::QueueEntry,
    repository::Store,
};

/// Put a user at the back of a book's queue
pub fn join_queue(
    store: &mut Store,
    rules: &LendingConfig,
    user_id: i64,
    book_id: i64,
    now: DateTime<Utc>,
) -> AppResult<i64> {
    let user = store.user(user_id)?;
    let book = store.book(book_id)?;

    if !rules.queue_when_available && book.available_copies > 0 {
        return Err(AppError::Conflict(format!(
            "Book '{}' is available; no need to queue",
            book.title
        )));
    }

    let memberships = user.queue_entries.len();
    if memberships >= rules.max_queue_memberships {
        return Err(AppError::Conflict(format!(
            "User '{}' already queued for {} books",
            user.username, memberships
        )));
    }

    if store.queue_entry_for(user_id, book_id)?.is_some() {
        return Err(AppError::Conflict(format!(
            "User '{}' already queued for book '{}'",
            user.username, book.title
        )));
    }

    if store.has_active_borrow(user_id, book_id)? {
        return Err(AppError::Conflict(format!(
            "User '{}' already borrowed book '{}'",
            user.username, book.title
        )));
    }

    let entry_id = store.insert_queue_entry(user_id, book_id, now)?;
    tracing::info!(entry_id, user_id, book_id, "Joined queue");
    Ok(entry_id)
}

/// Remove a queue entry on behalf of its owner
pub fn leave_queue(store: &mut Store, user_id: i64, entry_id: i64) -> AppResult<QueueEntry> {
    store.user(user_id)?;
    let entry = store.queue_entry(entry_id)?;
    if entry.user_id != user_id {
        return Err(AppError::State(format!(
            "Queue entry {} belongs to another user",
            entry_id
        )));
    }

    let entry = store.remove_queue_entry(entry_id)?;
    tracing::info!(entry_id, user_id, book_id = entry.book_id, "Left queue");
    Ok(entry)
}

/// Remove the user's entry from a book's queue
pub fn leave_queue_for_book(store: &mut Store, user_id: i64, book_id: i64) -> AppResult<QueueEntry> {
    store.book(book_id)?;
    let entry_id = store
        .queue_entry_for(user_id, book_id)?
        .map(|e| e.id)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Queue entry for user {} and book {} not found",
                user_id, book_id
            ))
        })?;
    leave_queue(store, user_id, entry_id)
}
