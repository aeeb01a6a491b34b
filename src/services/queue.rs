//! Reservation queue service

use std::sync::Arc;

use crate::{
    clock::Clock,
    config::LendingConfig,
    error::AppResult,
    lending,
    models::QueueMembership,
    repository::Repository,
};

#[derive(Clone)]
pub struct QueueService {
    repository: Repository,
    rules: Arc<LendingConfig>,
    clock: Arc<dyn Clock>,
}

impl QueueService {
    pub fn new(repository: Repository, rules: Arc<LendingConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            rules,
            clock,
        }
    }

    /// Join the queue of a book
    pub async fn join(&self, user_id: i64, book_id: i64) -> AppResult<QueueMembership> {
        let now = self.clock.now();
        let rules = Arc::clone(&self.rules);

        self.repository
            .transaction(|store| {
                let entry_id = lending::join_queue(store, &rules, user_id, book_id, now)?;
                store.queue_membership(entry_id)
            })
            .await
    }

    /// Leave the queue of a book
    pub async fn leave(&self, user_id: i64, book_id: i64) -> AppResult<()> {
        self.repository
            .transaction(|store| lending::leave_queue_for_book(store, user_id, book_id).map(|_| ()))
            .await
    }

    /// Drop a queue entry on behalf of `user_id`, who must own it
    pub async fn leave_entry(&self, user_id: i64, entry_id: i64) -> AppResult<()> {
        self.repository
            .transaction(|store| lending::leave_queue(store, user_id, entry_id).map(|_| ()))
            .await
    }

    /// Waiting list of a book, head first
    pub async fn book_queue(&self, book_id: i64) -> AppResult<Vec<QueueMembership>> {
        self.repository
            .read(|store| -> AppResult<Vec<QueueMembership>> {
                store
                    .queue_of(book_id)?
                    .into_iter()
                    .map(|e| store.queue_membership(e.id))
                    .collect()
            })
            .await
    }

    /// Queues the user waits in
    pub async fn user_queue(&self, user_id: i64) -> AppResult<Vec<QueueMembership>> {
        self.repository
            .read(|store| -> AppResult<Vec<QueueMembership>> {
                store
                    .queue_entries_of(user_id)?
                    .into_iter()
                    .map(|e| store.queue_membership(e.id))
                    .collect()
            })
            .await
    }
}
