//! Category records

use chrono::{DateTime, Utc};

use super::{next, Store};
use crate::{
    error::{AppError, AppResult},
    models::{category::CreateCategory, Category},
};

impl Store {
    /// Get category by ID
    pub fn category(&self, id: i64) -> AppResult<&Category> {
        self.categories
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    pub(super) fn category_mut(&mut self, id: i64) -> AppResult<&mut Category> {
        self.categories
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    fn check_category_name(&self, name: &str, except: Option<i64>) -> AppResult<()> {
        if self
            .categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
        {
            return Err(AppError::Conflict(format!(
                "Category with name '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    pub(crate) fn insert_category(
        &mut self,
        data: &CreateCategory,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        self.check_category_name(&data.name, None)?;

        let id = next(&mut self.sequences.categories);
        self.categories.insert(
            id,
            Category {
                id,
                name: data.name.clone(),
                created_at: now,
                books: Vec::new(),
            },
        );
        Ok(id)
    }

    pub(crate) fn rename_category(&mut self, id: i64, name: String) -> AppResult<&Category> {
        self.category(id)?;
        self.check_category_name(&name, Some(id))?;
        let category = self.category_mut(id)?;
        category.name = name;
        Ok(category)
    }

    /// Delete a category and untag its books
    pub(crate) fn remove_category(&mut self, id: i64) -> AppResult<Category> {
        let category = self
            .categories
            .shift_remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))?;
        for book_id in &category.books {
            if let Some(book) = self.books.get_mut(book_id) {
                book.categories.retain(|c| *c != id);
            }
        }
        Ok(category)
    }
}
