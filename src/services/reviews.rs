//! Review service

use std::sync::Arc;
use validator::Validate;

use crate::{
    clock::Clock,
    error::AppResult,
    lending,
    models::{
        review::{CreateReview, UpdateReview},
        Review,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl ReviewsService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn add(&self, data: CreateReview) -> AppResult<Review> {
        data.validate()?;
        let now = self.clock.now();
        self.repository
            .transaction(|store| {
                let id = lending::add_review(
                    store,
                    data.user_id,
                    data.book_id,
                    data.rating,
                    data.comment,
                    now,
                )?;
                Ok(store.review(id)?.clone())
            })
            .await
    }

    pub async fn get(&self, id: i64) -> AppResult<Review> {
        self.repository
            .read(|store| store.review(id).cloned())
            .await
    }

    pub async fn update(&self, id: i64, data: UpdateReview) -> AppResult<Review> {
        data.validate()?;
        let now = self.clock.now();
        self.repository
            .transaction(|store| {
                lending::update_review(store, data.user_id, id, data.rating, data.comment, now)
            })
            .await
    }

    /// Delete a review; `acting_user` defaults to its author
    pub async fn delete(&self, id: i64, acting_user: Option<i64>) -> AppResult<()> {
        self.repository
            .transaction(|store| lending::delete_review(store, acting_user, id).map(|_| ()))
            .await
    }

    pub async fn book_reviews(&self, book_id: i64) -> AppResult<Vec<Review>> {
        self.repository
            .read(|store| -> AppResult<Vec<Review>> {
                Ok(store.reviews_of_book(book_id)?.into_iter().cloned().collect())
            })
            .await
    }
}
