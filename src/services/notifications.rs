//! Notification records and fire-and-forget delivery

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{
    error::AppResult,
    models::{Notification, Recipient},
    repository::Repository,
};

/// Delivery hook for coordinator notifications
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn dispatch(&self, recipient: &Recipient, notification: &Notification) -> AppResult<()>;
}

/// Notifier that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn dispatch(&self, recipient: &Recipient, notification: &Notification) -> AppResult<()> {
        tracing::info!(
            "Notification {} for {} ({}): {}",
            notification.id,
            recipient.username,
            recipient.user_id,
            notification.subject
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    repository: Repository,
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    pub fn new(repository: Repository, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Notifications of a user, oldest first
    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<Notification>> {
        self.repository
            .read(|store| -> AppResult<Vec<Notification>> {
                Ok(store
                    .notifications_for(user_id)?
                    .into_iter()
                    .cloned()
                    .collect())
            })
            .await
    }

    /// Fire-and-forget variant of [`dispatch`](Self::dispatch) for request paths
    pub fn dispatch_detached(&self, notification_ids: Vec<i64>) {
        drop(self.dispatch(notification_ids));
    }

    /// Deliver committed notifications in the background.
    ///
    /// Delivery failures are logged and dropped; they never reach the caller.
    pub fn dispatch(&self, notification_ids: Vec<i64>) -> JoinHandle<()> {
        let repository = self.repository.clone();
        let notifier = Arc::clone(&self.notifier);

        tokio::spawn(async move {
            if notification_ids.is_empty() {
                return;
            }

            let batch: Vec<(Recipient, Notification)> = repository
                .read(|store| {
                    notification_ids
                        .iter()
                        .filter_map(|id| {
                            let notification = store.notification(*id).ok()?;
                            let recipient = store.recipient(notification.user_id).ok()?;
                            Some((recipient, notification.clone()))
                        })
                        .collect()
                })
                .await;

            for (recipient, notification) in batch {
                if let Err(e) = notifier.dispatch(&recipient, &notification).await {
                    tracing::warn!(
                        "Failed to deliver notification {} to user {}: {}",
                        notification.id,
                        recipient.user_id,
                        e
                    );
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, models::user::CreateUser};
    use chrono::Utc;

    async fn seeded() -> (Repository, Vec<i64>) {
        let repository = Repository::new();
        let ids = repository
            .transaction(|store| {
                let user = store.insert_user(
                    &CreateUser {
                        username: "alice".into(),
                        email: "alice@example.org".into(),
                        firstname: None,
                        lastname: None,
                    },
                    Utc::now(),
                )?;
                let first = store.insert_notification(user, "One", "first".into(), Utc::now())?;
                let second = store.insert_notification(user, "Two", "second".into(), Utc::now())?;
                Ok(vec![first, second])
            })
            .await
            .unwrap();
        (repository, ids)
    }

    #[tokio::test]
    async fn test_every_notification_is_dispatched() {
        let (repository, ids) = seeded().await;
        let mut notifier = MockNotifier::new();
        notifier
            .expect_dispatch()
            .withf(|recipient, _| recipient.email == "alice@example.org")
            .times(2)
            .returning(|_, _| Ok(()));

        let service = NotificationService::new(repository, Arc::new(notifier));
        service.dispatch(ids).await.unwrap();
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let (repository, ids) = seeded().await;
        let mut notifier = MockNotifier::new();
        notifier
            .expect_dispatch()
            .times(2)
            .returning(|_, _| Err(AppError::Internal("smtp down".into())));

        let service = NotificationService::new(repository.clone(), Arc::new(notifier));
        assert!(service.dispatch(ids).await.is_ok());

        let stored = service.list_for_user(1).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].message, "second");
    }

    #[tokio::test]
    async fn test_detached_dispatch_still_delivers() {
        let (repository, ids) = seeded().await;
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_dispatch()
            .times(2)
            .returning(move |_, notification| {
                tx.send(notification.id).unwrap();
                Ok(())
            });

        let service = NotificationService::new(repository, Arc::new(notifier));
        service.dispatch_detached(ids.clone());

        let mut delivered = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        delivered.sort();
        assert_eq!(delivered, ids);
    }
}
