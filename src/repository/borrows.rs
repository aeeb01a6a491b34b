//! Borrow records

use chrono::{DateTime, Utc};

use super::{next, Store};
use crate::{
    error::{AppError, AppResult},
    models::{borrow::due_date, Borrow, BorrowOrigin, BorrowRecord},
};

impl Store {
    /// Get borrow by ID
    pub fn borrow(&self, id: i64) -> AppResult<&Borrow> {
        self.borrows
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Borrow with id {} not found", id)))
    }

    /// All borrows, oldest first
    pub fn borrows(&self) -> impl Iterator<Item = &Borrow> {
        self.borrows.values()
    }

    /// Record a new active borrow and attach it to its user and book
    pub(crate) fn insert_borrow(
        &mut self,
        user_id: i64,
        book_id: i64,
        duration_days: i64,
        origin: BorrowOrigin,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        // Resolve both owners before touching anything
        self.user(user_id)?;
        self.book(book_id)?;
        let due_at = due_date(now, duration_days).ok_or_else(|| {
            AppError::Internal(format!("Due date overflow for a {} day borrow", duration_days))
        })?;

        let id = next(&mut self.sequences.borrows);
        self.borrows.insert(
            id,
            Borrow {
                id,
                user_id,
                book_id,
                borrowed_at: now,
                duration_days,
                due_at,
                returned_at: None,
                origin,
            },
        );
        self.user_mut(user_id)?.borrows.push(id);
        self.book_mut(book_id)?.borrows.push(id);
        Ok(id)
    }

    /// Close a borrow; a returned borrow stays returned
    pub(crate) fn mark_returned(&mut self, id: i64, now: DateTime<Utc>) -> AppResult<()> {
        let borrow = self
            .borrows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Borrow with id {} not found", id)))?;
        if borrow.is_returned() {
            return Err(AppError::Conflict(format!("Borrow {} is already returned", id)));
        }
        borrow.returned_at = Some(now);
        Ok(())
    }

    pub fn borrow_record(&self, id: i64, now: DateTime<Utc>) -> AppResult<BorrowRecord> {
        let borrow = self.borrow(id)?;
        let book = self.book(borrow.book_id)?;
        Ok(BorrowRecord::new(borrow, &book.title, now))
    }
}
