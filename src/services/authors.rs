//! Author management

use std::sync::Arc;
use validator::Validate;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{
        author::{CreateAuthor, UpdateAuthor},
        Author,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl AuthorsService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn list(&self) -> Vec<Author> {
        self.repository
            .read(|store| store.authors().cloned().collect())
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Author> {
        self.repository
            .read(|store| store.author(id).cloned())
            .await
    }

    pub async fn create(&self, data: CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let now = self.clock.now();

        let author = self
            .repository
            .transaction(|store| {
                let id = store.insert_author(&data, now)?;
                store.author(id).cloned()
            })
            .await?;

        tracing::info!("Created author {} ({})", author.name, author.id);
        Ok(author)
    }

    pub async fn update(&self, id: i64, data: UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.repository
            .transaction(|store| match data.name {
                Some(name) => store.rename_author(id, name).cloned(),
                None => store.author(id).cloned(),
            })
            .await
    }

    /// Delete an author; their books remain without one
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let author = self
            .repository
            .transaction(|store| store.remove_author(id))
            .await?;
        tracing::info!("Deleted author {} ({} books detached)", id, author.books.len());
        Ok(())
    }
}
