//! Business logic services

pub mod authors;
pub mod catalog;
pub mod categories;
pub mod email;
pub mod lending;
pub mod notifications;
pub mod queue;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use crate::{
    clock::Clock,
    config::{EmailConfig, LendingConfig},
    repository::Repository,
};

use notifications::{LogNotifier, Notifier};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub authors: authors::AuthorsService,
    pub categories: categories::CategoriesService,
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub queue: queue::QueueService,
    pub reviews: reviews::ReviewsService,
    pub notifications: notifications::NotificationService,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(
        repository: Repository,
        lending_config: LendingConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let rules = Arc::new(lending_config);
        let notifications = notifications::NotificationService::new(repository.clone(), notifier);

        Self {
            users: users::UsersService::new(repository.clone(), Arc::clone(&clock)),
            authors: authors::AuthorsService::new(repository.clone(), Arc::clone(&clock)),
            categories: categories::CategoriesService::new(repository.clone(), Arc::clone(&clock)),
            catalog: catalog::CatalogService::new(
                repository.clone(),
                Arc::clone(&rules),
                Arc::clone(&clock),
                notifications.clone(),
            ),
            lending: lending::LendingService::new(
                repository.clone(),
                Arc::clone(&rules),
                Arc::clone(&clock),
                notifications.clone(),
            ),
            queue: queue::QueueService::new(repository.clone(), rules, Arc::clone(&clock)),
            reviews: reviews::ReviewsService::new(repository, clock),
            notifications,
        }
    }
}

/// Pick the notification transport from configuration
pub fn notifier_from_config(config: &EmailConfig) -> Arc<dyn Notifier> {
    if config.enabled {
        tracing::info!("Notifications delivered by email via {}", config.smtp_host);
        Arc::new(email::EmailService::new(config.clone()))
    } else {
        tracing::info!("Email disabled; notifications are only logged");
        Arc::new(LogNotifier)
    }
}
