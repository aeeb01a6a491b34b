//! Borrow and return service

use std::sync::Arc;

use crate::{
    clock::Clock,
    config::LendingConfig,
    error::AppResult,
    lending::{self, SweepReport},
    models::{BorrowOrigin, BorrowRecord},
    repository::Repository,
};

use super::notifications::NotificationService;

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    rules: Arc<LendingConfig>,
    clock: Arc<dyn Clock>,
    notifications: NotificationService,
}

impl LendingService {
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

    /// Lend a copy of a book to a user
    pub async fn borrow(
        &self,
        user_id: i64,
        book_id: i64,
        duration_days: Option<i64>,
    ) -> AppResult<BorrowRecord> {
        let now = self.clock.now();
        let rules = Arc::clone(&self.rules);
        let duration = duration_days.unwrap_or(rules.default_borrow_days);

        self.repository
            .transaction(|store| {
                let borrow_id = lending::borrow_book(
                    store,
                    &rules,
                    user_id,
                    book_id,
                    duration,
                    BorrowOrigin::Direct,
                    now,
                )?;
                store.borrow_record(borrow_id, now)
            })
            .await
    }

    /// Return a borrow and hand the copy to the next queued user, if any.
    ///
    /// `acting_user` defaults to the borrower.
    pub async fn return_borrow(
        &self,
        borrow_id: i64,
        acting_user: Option<i64>,
    ) -> AppResult<BorrowRecord> {
        let now = self.clock.now();
        let rules = Arc::clone(&self.rules);

        let (record, report) = self
            .repository
            .transaction(|store| {
                let book_id = lending::return_book(store, acting_user, borrow_id, now)?;
                let report = lending::sweep(store, &rules, book_id, now)?;
                Ok((store.borrow_record(borrow_id, now)?, report))
            })
            .await?;

        self.announce(report);
        Ok(record)
    }

    /// Re-run the auto-borrow sweep on a book
    pub async fn sweep(&self, book_id: i64) -> AppResult<SweepReport> {
        let now = self.clock.now();
        let rules = Arc::clone(&self.rules);

        let report = self
            .repository
            .transaction(|store| lending::sweep(store, &rules, book_id, now))
            .await?;

        let summary = report.clone();
        self.announce(report);
        Ok(summary)
    }

    pub async fn get_borrow(&self, id: i64) -> AppResult<BorrowRecord> {
        let now = self.clock.now();
        self.repository
            .read(|store| store.borrow_record(id, now))
            .await
    }

    /// All borrows, oldest first
    pub async fn list_borrows(&self, active_only: bool) -> AppResult<Vec<BorrowRecord>> {
        let now = self.clock.now();
        self.repository
            .read(|store| {
                store
                    .borrows()
                    .filter(|b| !active_only || !b.is_returned())
                    .map(|b| store.borrow_record(b.id, now))
                    .collect()
            })
            .await
    }

    /// Borrows of a user, oldest first
    pub async fn user_borrows(&self, user_id: i64, active_only: bool) -> AppResult<Vec<BorrowRecord>> {
        let now = self.clock.now();
        self.repository
            .read(|store| -> AppResult<Vec<BorrowRecord>> {
                store
                    .borrows_of(user_id)?
                    .into_iter()
                    .filter(|b| !active_only || !b.is_returned())
                    .map(|b| store.borrow_record(b.id, now))
                    .collect()
            })
            .await
    }

    fn announce(&self, report: SweepReport) {
        if report.is_empty() {
            return;
        }
        tracing::info!(
            "Sweep on book {}: {} assigned, {} forfeited",
            report.book_id,
            report.assigned.len(),
            report.forfeited.len()
        );
        self.notifications.dispatch_detached(report.notifications);
    }
}
