//! Catalog management service

use std::sync::Arc;
use validator::Validate;

use crate::{
    clock::Clock,
    config::LendingConfig,
    error::AppResult,
    lending,
    models::{
        book::{CreateBook, UpdateBook},
        BookDetails,
    },
    repository::Repository,
};

use super::notifications::NotificationService;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    rules: Arc<LendingConfig>,
    clock: Arc<dyn Clock>,
    notifications: NotificationService,
}

impl CatalogService {
    pub fn new(
        repository: Repository,
        rules: Arc<LendingConfig>,
        clock: Arc<dyn Clock>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            repository,
            rules,
            clock,
            notifications,
        }
    }

    /// Add a title to the catalog
    pub async fn create_book(&self, data: CreateBook) -> AppResult<BookDetails> {
        data.validate()?;
        let now = self.clock.now();

        let book = self
            .repository
            .transaction(|store| {
                let id = store.insert_book(&data, now)?;
                store.book_details(id)
            })
            .await?;

        tracing::info!(
            "Catalog: created book '{}' ({}) with {} copies",
            book.title,
            book.id,
            book.available_copies
        );
        Ok(book)
    }

    pub async fn get_book(&self, id: i64) -> AppResult<BookDetails> {
        self.repository.read(|store| store.book_details(id)).await
    }

    pub async fn list_books(&self) -> AppResult<Vec<BookDetails>> {
        self.repository
            .read(|store| store.books().map(|b| store.book_details(b.id)).collect())
            .await
    }

    /// Put new copies on the shelf; queued users are served first
    pub async fn add_copies(&self, book_id: i64, count: u32) -> AppResult<BookDetails> {
        let now = self.clock.now();
        let rules = Arc::clone(&self.rules);

        let (book, notifications) = self
            .repository
            .transaction(|store| {
                lending::restock(store, book_id, count)?;
                let report = lending::sweep(store, &rules, book_id, now)?;
                Ok((store.book_details(book_id)?, report.notifications))
            })
            .await?;

        self.notifications.dispatch_detached(notifications);
        Ok(book)
    }

    /// Take shelf copies out of circulation
    pub async fn withdraw_copies(&self, book_id: i64, count: u32) -> AppResult<BookDetails> {
        self.repository
            .transaction(|store| {
                lending::withdraw(store, book_id, count)?;
                store.book_details(book_id)
            })
            .await
    }

    /// Edit a book. A new shelf count goes through restock or withdrawal, and a
    /// raise serves the queue, all in the same transaction.
    pub async fn update_book(&self, id: i64, data: UpdateBook) -> AppResult<BookDetails> {
        data.validate()?;
        let now = self.clock.now();
        let rules = Arc::clone(&self.rules);

        let (book, notifications) = self
            .repository
            .transaction(|store| {
                store.update_book(id, data.title, data.author_id, data.category_ids.as_deref())?;
                let mut notifications = Vec::new();
                if let Some(target) = data.available_copies {
                    let before = store.book(id)?.available_copies;
                    if lending::set_shelf_copies(store, id, target)? > before {
                        notifications = lending::sweep(store, &rules, id, now)?.notifications;
                    }
                }
                Ok((store.book_details(id)?, notifications))
            })
            .await?;

        self.notifications.dispatch_detached(notifications);
        Ok(book)
    }

    /// Remove a book that has no copies lent out; its queue is cancelled
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        let now = self.clock.now();
        let notifications = self
            .repository
            .transaction(|store| lending::retire_book(store, id, now))
            .await?;

        tracing::info!("Catalog: deleted book {}", id);
        self.notifications.dispatch_detached(notifications);
        Ok(())
    }
}
