//! Shelf stock changes outside of lending

use std::cmp::Ordering;

use crate::{
    error::{AppError, AppResult},
    repository::Store,
};

/// Add newly acquired copies to the shelf.
///
/// New copies belong to the queue first, so callers run the sweep afterwards.
pub fn restock(store: &mut Store, book_id: i64, count: u32) -> AppResult<u32> {
    if count == 0 {
        return Err(AppError::Validation("Count must be at least 1".to_string()));
    }
    let available = store.add_copies(book_id, count)?;
    tracing::info!(book_id, count, available, "Copies added");
    Ok(available)
}

/// Take copies off the shelf for good (lost, damaged, weeded)
pub fn withdraw(store: &mut Store, book_id: i64, count: u32) -> AppResult<u32> {
    if count == 0 {
        return Err(AppError::Validation("Count must be at least 1".to_string()));
    }
    let available = store.withdraw_copies(book_id, count)?;
    tracing::info!(book_id, count, available, "Copies withdrawn");
    Ok(available)
}

/// Bring the shelf count of a book to `target`.
///
/// Raising it is a restock and lowering it a withdrawal, with the same rules.
/// Returns the new shelf count; callers sweep when it went up.
pub fn set_shelf_copies(store: &mut Store, book_id: i64, target: u32) -> AppResult<u32> {
    let current = store.book(book_id)?.available_copies;
    match target.cmp(&current) {
        Ordering::Greater => restock(store, book_id, target - current),
        Ordering::Less => withdraw(store, book_id, current - target),
        Ordering::Equal => Ok(current),
    }
}
