//! Category management

use std::sync::Arc;
use validator::Validate;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{
        category::{CreateCategory, UpdateCategory},
        Category,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl CategoriesService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn list(&self) -> Vec<Category> {
        self.repository
            .read(|store| store.categories().cloned().collect())
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Category> {
        self.repository
            .read(|store| store.category(id).cloned())
            .await
    }

    pub async fn create(&self, data: CreateCategory) -> AppResult<Category> {
        data.validate()?;
        let now = self.clock.now();

        let category = self
            .repository
            .transaction(|store| {
                let id = store.insert_category(&data, now)?;
                store.category(id).cloned()
            })
            .await?;

        tracing::info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn update(&self, id: i64, data: UpdateCategory) -> AppResult<Category> {
        data.validate()?;
        self.repository
            .transaction(|store| match data.name {
                Some(name) => store.rename_category(id, name).cloned(),
                None => store.category(id).cloned(),
            })
            .await
    }

    /// Delete a category and untag its books
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let category = self
            .repository
            .transaction(|store| store.remove_category(id))
            .await?;
        tracing::info!("Deleted category {} ({} books untagged)", id, category.books.len());
        Ok(())
    }
}
