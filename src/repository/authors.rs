//! Author records

use chrono::{DateTime, Utc};

use super::{next, Store};
use crate::{
    error::{AppError, AppResult},
    models::{author::CreateAuthor, Author},
};

impl Store {
    /// Get author by ID
    pub fn author(&self, id: i64) -> AppResult<&Author> {
        self.authors
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    pub(super) fn author_mut(&mut self, id: i64) -> AppResult<&mut Author> {
        self.authors
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    pub fn authors(&self) -> impl Iterator<Item = &Author> {
        self.authors.values()
    }

    pub(crate) fn insert_author(&mut self, data: &CreateAuthor, now: DateTime<Utc>) -> AppResult<i64> {
        let id = next(&mut self.sequences.authors);
        self.authors.insert(
            id,
            Author {
                id,
                name: data.name.clone(),
                created_at: now,
                books: Vec::new(),
            },
        );
        Ok(id)
    }

    pub(crate) fn rename_author(&mut self, id: i64, name: String) -> AppResult<&Author> {
        let author = self.author_mut(id)?;
        author.name = name;
        Ok(author)
    }

    /// Delete an author; their books stay in the catalog without one
    pub(crate) fn remove_author(&mut self, id: i64) -> AppResult<Author> {
        let author = self
            .authors
            .shift_remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;
        for book_id in &author.books {
            if let Some(book) = self.books.get_mut(book_id) {
                book.author_id = None;
            }
        }
        Ok(author)
    }
}
