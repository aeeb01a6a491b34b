//! Handing out and taking back copies

use chrono::{DateTime, Utc};

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{borrow::MAX_BORROW_DAYS, BorrowOrigin},
    repository::Store,
};

/// Lend one copy of a book to a user.
///
/// Rejected, in this order, when the user is at the borrow limit, when the user
/// already holds a copy of the book, and when no shelf copy is left for the user
/// once queued users ahead of them are served. A successful borrow consumes the
/// user's own queue entry for the book.
pub fn borrow_book(
    store: &mut Store,
    rules: &LendingConfig,
    user_id: i64,
    book_id: i64,
    duration_days: i64,
    origin: BorrowOrigin,
    now: DateTime<Utc>,
) -> AppResult<i64> {
    if !(1..=MAX_BORROW_DAYS).contains(&duration_days) {
        return Err(AppError::Validation(format!(
            "Borrow duration must be between 1 and {} days, got {}",
            MAX_BORROW_DAYS, duration_days
        )));
    }

    let user = store.user(user_id)?;
    let book = store.book(book_id)?;

    let active = store.active_borrow_count(user_id)?;
    if active >= rules.max_active_borrows {
        return Err(AppError::Conflict(format!(
            "User '{}' already has {} books borrowed",
            user.username, active
        )));
    }

    if store.has_active_borrow(user_id, book_id)? {
        return Err(AppError::Conflict(format!(
            "User '{}' already borrowed book '{}'",
            user.username, book.title
        )));
    }

    if book.available_copies == 0 {
        return Err(AppError::Conflict(format!(
            "No copies of book '{}' are available",
            book.title
        )));
    }

    let ahead = store.entries_ahead(user_id, book_id)?;
    if ahead >= book.available_copies as usize {
        return Err(AppError::Conflict(format!(
            "Book '{}' is reserved by another user (queue)",
            book.title
        )));
    }

    let reservation = store.queue_entry_for(user_id, book_id)?.map(|e| e.id);
    if let Some(entry_id) = reservation {
        store.remove_queue_entry(entry_id)?;
    }
    store.take_copy(book_id)?;
    let borrow_id = store.insert_borrow(user_id, book_id, duration_days, origin, now)?;

    tracing::info!(
        borrow_id,
        user_id,
        book_id,
        ?origin,
        fulfilled_reservation = reservation.is_some(),
        "Book borrowed"
    );

    Ok(borrow_id)
}

/// Take back a borrowed copy and put it on the shelf.
///
/// `acting_user` is the user performing the return; `None` means the borrower
/// themself. Returning for someone else is an ownership error, returning twice a
/// conflict. The caller is expected to run the auto-borrow sweep on the returned
/// book within the same transaction.
pub fn return_book(
    store: &mut Store,
    acting_user: Option<i64>,
    borrow_id: i64,
    now: DateTime<Utc>,
) -> AppResult<i64> {
    let borrow = store.borrow(borrow_id)?;

    if let Some(actor) = acting_user {
        store.user(actor)?;
        if borrow.user_id != actor {
            return Err(AppError::State(format!(
                "Borrow {} belongs to another user",
                borrow_id
            )));
        }
    }

    if borrow.is_returned() {
        return Err(AppError::Conflict(format!(
            "Borrow {} is already returned",
            borrow_id
        )));
    }

    let book_id = borrow.book_id;
    let user_id = borrow.user_id;
    store.put_back_copy(book_id)?;
    store.mark_returned(borrow_id, now)?;

    tracing::info!(borrow_id, user_id, book_id, "Book returned");

    Ok(book_id)
}
