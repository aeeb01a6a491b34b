//! Reservation queue entries

use chrono::{DateTime, Utc};

use super::{next, Store};
use crate::{
    error::{AppError, AppResult},
    models::{QueueEntry, QueueMembership},
};

impl Store {
    /// Get queue entry by ID
    pub fn queue_entry(&self, id: i64) -> AppResult<&QueueEntry> {
        self.queue_entries
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Queue entry with id {} not found", id)))
    }

    /// The user's entry in the book's queue, if any
    pub fn queue_entry_for(&self, user_id: i64, book_id: i64) -> AppResult<Option<&QueueEntry>> {
        Ok(self
            .user(user_id)?
            .queue_entries
            .iter()
            .filter_map(|id| self.queue_entries.get(id))
            .find(|e| e.book_id == book_id))
    }

    /// Queue entries the user holds, in join order
    pub fn queue_entries_of(&self, user_id: i64) -> AppResult<Vec<&QueueEntry>> {
        Ok(self
            .user(user_id)?
            .queue_entries
            .iter()
            .filter_map(|id| self.queue_entries.get(id))
            .collect())
    }

    /// Append a user to a book's queue.
    ///
    /// The book queue stays sorted by `joined_at`; entries joining at the same
    /// instant keep their arrival order.
    pub(crate) fn insert_queue_entry(
        &mut self,
        user_id: i64,
        book_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        self.user(user_id)?;
        let position = {
            let book = self.book(book_id)?;
            book.queue
                .iter()
                .position(|eid| {
                    self.queue_entries
                        .get(eid)
                        .is_some_and(|e| e.joined_at > now)
                })
                .unwrap_or(book.queue.len())
        };

        let id = next(&mut self.sequences.queue_entries);
        self.queue_entries.insert(
            id,
            QueueEntry {
                id,
                user_id,
                book_id,
                joined_at: now,
            },
        );
        self.user_mut(user_id)?.queue_entries.push(id);
        self.book_mut(book_id)?.queue.insert(position, id);
        Ok(id)
    }

    /// Delete an entry and both references to it
    pub(crate) fn remove_queue_entry(&mut self, id: i64) -> AppResult<QueueEntry> {
        let entry = self
            .queue_entries
            .shift_remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Queue entry with id {} not found", id)))?;
        if let Some(user) = self.users.get_mut(&entry.user_id) {
            user.queue_entries.retain(|eid| *eid != id);
        }
        if let Some(book) = self.books.get_mut(&entry.book_id) {
            book.queue.retain(|eid| *eid != id);
        }
        Ok(entry)
    }

    /// Number of other users' entries ahead of the user in the book's queue.
    ///
    /// A user who is not queued has the whole queue ahead of them.
    pub fn entries_ahead(&self, user_id: i64, book_id: i64) -> AppResult<usize> {
        let queue = self.queue_of(book_id)?;
        Ok(queue
            .iter()
            .take_while(|e| e.user_id != user_id)
            .count())
    }

    pub fn queue_membership(&self, id: i64) -> AppResult<QueueMembership> {
        let entry = self.queue_entry(id)?;
        let user = self.user(entry.user_id)?;
        let book = self.book(entry.book_id)?;
        let position = book
            .queue
            .iter()
            .position(|eid| *eid == id)
            .map(|p| p + 1)
            .ok_or_else(|| {
                AppError::Internal(format!("Queue entry {} missing from book {}", id, book.id))
            })?;

        Ok(QueueMembership {
            id: entry.id,
            user_id: user.id,
            username: user.username.clone(),
            book_id: book.id,
            book_title: book.title.clone(),
            joined_at: entry.joined_at,
            position,
        })
    }
}
