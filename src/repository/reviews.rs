//! Review records

use chrono::{DateTime, Utc};

use super::{next, Store};
use crate::{
    error::{AppError, AppResult},
    models::Review,
};

impl Store {
    /// Get review by ID
    pub fn review(&self, id: i64) -> AppResult<&Review> {
        self.reviews
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Review with id {} not found", id)))
    }

    /// The user's review of the book, if written
    pub fn review_by(&self, user_id: i64, book_id: i64) -> AppResult<Option<&Review>> {
        Ok(self
            .user(user_id)?
            .reviews
            .iter()
            .filter_map(|id| self.reviews.get(id))
            .find(|r| r.book_id == book_id))
    }

    pub fn reviews_of_book(&self, book_id: i64) -> AppResult<Vec<&Review>> {
        Ok(self
            .book(book_id)?
            .reviews
            .iter()
            .filter_map(|id| self.reviews.get(id))
            .collect())
    }

    pub(crate) fn insert_review(
        &mut self,
        user_id: i64,
        book_id: i64,
        rating: u8,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        self.user(user_id)?;
        self.book(book_id)?;

        let id = next(&mut self.sequences.reviews);
        self.reviews.insert(
            id,
            Review {
                id,
                user_id,
                book_id,
                rating,
                comment,
                created_at: now,
                updated_at: None,
            },
        );
        self.user_mut(user_id)?.reviews.push(id);
        self.book_mut(book_id)?.reviews.push(id);
        Ok(id)
    }

    pub(crate) fn update_review(
        &mut self,
        id: i64,
        rating: Option<u8>,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<&Review> {
        let review = self
            .reviews
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Review with id {} not found", id)))?;
        if let Some(rating) = rating {
            review.rating = rating;
        }
        if comment.is_some() {
            review.comment = comment;
        }
        review.updated_at = Some(now);
        Ok(review)
    }

    /// Delete a review and both references to it
    pub(crate) fn remove_review(&mut self, id: i64) -> AppResult<Review> {
        let review = self
            .reviews
            .shift_remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Review with id {} not found", id)))?;
        if let Some(user) = self.users.get_mut(&review.user_id) {
            user.reviews.retain(|rid| *rid != id);
        }
        if let Some(book) = self.books.get_mut(&review.book_id) {
            book.reviews.retain(|rid| *rid != id);
        }
        Ok(review)
    }
}
