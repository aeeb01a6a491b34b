//! User registration and lookup

use std::sync::Arc;
use validator::Validate;

use crate::{
    clock::Clock,
    error::AppResult,
    lending,
    models::{
        user::{CreateUser, UpdateUser},
        UserDetails,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl UsersService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Register a new user
    pub async fn create(&self, data: CreateUser) -> AppResult<UserDetails> {
        data.validate()?;
        let now = self.clock.now();

        let user = self
            .repository
            .transaction(|store| {
                let id = store.insert_user(&data, now)?;
                store.user_details(id)
            })
            .await?;

        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<UserDetails> {
        self.repository.read(|store| store.user_details(id)).await
    }

    pub async fn list(&self) -> AppResult<Vec<UserDetails>> {
        self.repository
            .read(|store| store.users().map(|u| store.user_details(u.id)).collect())
            .await
    }

    pub async fn update(&self, id: i64, data: UpdateUser) -> AppResult<UserDetails> {
        data.validate()?;
        self.repository
            .transaction(|store| {
                store.update_user(id, &data)?;
                store.user_details(id)
            })
            .await
    }

    /// Delete a user who holds no books
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository
            .transaction(|store| lending::close_account(store, id))
            .await?;
        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}
