//! Book copy ledger

use chrono::{DateTime, Utc};

use super::{next, Store};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookDetails, CreateBook},
        Book, Label, QueueEntry,
    },
};

impl Store {
    /// Get book by ID
    pub fn book(&self, id: i64) -> AppResult<&Book> {
        self.books
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub(super) fn book_mut(&mut self, id: i64) -> AppResult<&mut Book> {
        self.books
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// All books in catalog order
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    fn check_title(&self, title: &str, except: Option<i64>) -> AppResult<()> {
        if self
            .books
            .values()
            .any(|b| b.title == title && Some(b.id) != except)
        {
            return Err(AppError::Conflict(format!("Book '{}' already exists", title)));
        }
        Ok(())
    }

    /// Check that the linked author and categories exist; drops repeated category ids
    fn resolve_links(&self, author_id: Option<i64>, category_ids: &[i64]) -> AppResult<Vec<i64>> {
        if let Some(author_id) = author_id {
            self.author(author_id)?;
        }
        let mut categories = Vec::with_capacity(category_ids.len());
        for id in category_ids {
            self.category(*id)?;
            if !categories.contains(id) {
                categories.push(*id);
            }
        }
        Ok(categories)
    }

    /// Add a title to the catalog; titles are unique
    pub(crate) fn insert_book(&mut self, data: &CreateBook, now: DateTime<Utc>) -> AppResult<i64> {
        self.check_title(&data.title, None)?;
        let categories = self.resolve_links(data.author_id, &data.category_ids)?;

        let id = next(&mut self.sequences.books);
        self.books.insert(
            id,
            Book {
                id,
                title: data.title.clone(),
                author_id: None,
                categories: Vec::new(),
                available_copies: data.available_copies,
                created_at: now,
                borrows: Vec::new(),
                queue: Vec::new(),
                reviews: Vec::new(),
            },
        );
        self.set_author(id, data.author_id)?;
        self.set_categories(id, categories)?;
        Ok(id)
    }

    /// Change the bibliographic fields of a book; `None` keeps the current value
    pub(crate) fn update_book(
        &mut self,
        id: i64,
        title: Option<String>,
        author_id: Option<i64>,
        category_ids: Option<&[i64]>,
    ) -> AppResult<()> {
        self.book(id)?;
        if let Some(title) = &title {
            self.check_title(title, Some(id))?;
        }
        self.resolve_links(author_id, &[])?;
        let categories = category_ids
            .map(|ids| self.resolve_links(None, ids))
            .transpose()?;

        if let Some(title) = title {
            self.book_mut(id)?.title = title;
        }
        if author_id.is_some() {
            self.set_author(id, author_id)?;
        }
        if let Some(categories) = categories {
            self.set_categories(id, categories)?;
        }
        Ok(())
    }

    fn set_author(&mut self, book_id: i64, author_id: Option<i64>) -> AppResult<()> {
        let previous = std::mem::replace(&mut self.book_mut(book_id)?.author_id, author_id);
        if let Some(previous) = previous {
            if let Some(author) = self.authors.get_mut(&previous) {
                author.books.retain(|b| *b != book_id);
            }
        }
        if let Some(author_id) = author_id {
            self.author_mut(author_id)?.books.push(book_id);
        }
        Ok(())
    }

    fn set_categories(&mut self, book_id: i64, categories: Vec<i64>) -> AppResult<()> {
        let previous = std::mem::replace(&mut self.book_mut(book_id)?.categories, categories.clone());
        for id in previous {
            if let Some(category) = self.categories.get_mut(&id) {
                category.books.retain(|b| *b != book_id);
            }
        }
        for id in categories {
            self.category_mut(id)?.books.push(book_id);
        }
        Ok(())
    }

    /// Delete a book with its queue entries, reviews and borrow history, and
    /// unlink it from its users, author and categories
    pub(crate) fn remove_book(&mut self, id: i64) -> AppResult<Book> {
        let book = self
            .books
            .shift_remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        for entry_id in &book.queue {
            if let Some(entry) = self.queue_entries.shift_remove(entry_id) {
                if let Some(user) = self.users.get_mut(&entry.user_id) {
                    user.queue_entries.retain(|e| e != entry_id);
                }
            }
        }
        for review_id in &book.reviews {
            if let Some(review) = self.reviews.shift_remove(review_id) {
                if let Some(user) = self.users.get_mut(&review.user_id) {
                    user.reviews.retain(|r| r != review_id);
                }
            }
        }
        for borrow_id in &book.borrows {
            if let Some(borrow) = self.borrows.shift_remove(borrow_id) {
                if let Some(user) = self.users.get_mut(&borrow.user_id) {
                    user.borrows.retain(|b| b != borrow_id);
                }
            }
        }
        if let Some(author) = book.author_id.and_then(|a| self.authors.get_mut(&a)) {
            author.books.retain(|b| *b != id);
        }
        for category_id in &book.categories {
            if let Some(category) = self.categories.get_mut(category_id) {
                category.books.retain(|b| *b != id);
            }
        }
        Ok(book)
    }

    /// Move one copy from the shelf to a borrower
    pub(crate) fn take_copy(&mut self, book_id: i64) -> AppResult<()> {
        let book = self.book_mut(book_id)?;
        let Some(remaining) = book.available_copies.checked_sub(1) else {
            return Err(AppError::Conflict(format!(
                "No copies of book '{}' are available",
                book.title
            )));
        };
        book.available_copies = remaining;
        Ok(())
    }

    /// Put a returned copy back on the shelf
    pub(crate) fn put_back_copy(&mut self, book_id: i64) -> AppResult<()> {
        let book = self.book_mut(book_id)?;
        book.available_copies = book
            .available_copies
            .checked_add(1)
            .ok_or_else(|| AppError::Internal(format!("Copy count overflow on book {}", book_id)))?;
        Ok(())
    }

    /// Register newly acquired copies
    pub(crate) fn add_copies(&mut self, book_id: i64, count: u32) -> AppResult<u32> {
        let book = self.book_mut(book_id)?;
        book.available_copies = book
            .available_copies
            .checked_add(count)
            .ok_or_else(|| AppError::Validation(format!("Too many copies for book {}", book_id)))?;
        Ok(book.available_copies)
    }

    /// Remove copies from circulation; only shelf copies can be withdrawn
    pub(crate) fn withdraw_copies(&mut self, book_id: i64, count: u32) -> AppResult<u32> {
        let book = self.book_mut(book_id)?;
        if count > book.available_copies {
            return Err(AppError::Conflict(format!(
                "Cannot withdraw {} copies of book '{}': only {} on the shelf",
                count, book.title, book.available_copies
            )));
        }
        book.available_copies -= count;
        Ok(book.available_copies)
    }

    /// Number of copies of the book currently lent out
    pub fn outstanding_copies(&self, book_id: i64) -> AppResult<u32> {
        let book = self.book(book_id)?;
        let outstanding = book
            .borrows
            .iter()
            .filter_map(|id| self.borrows.get(id))
            .filter(|b| !b.is_returned())
            .count();
        u32::try_from(outstanding)
            .map_err(|_| AppError::Internal(format!("Borrow count overflow on book {}", book_id)))
    }

    /// Shelf copies plus lent copies; borrowing and returning never change it
    pub fn copies_in_circulation(&self, book_id: i64) -> AppResult<u32> {
        Ok(self.book(book_id)?.available_copies + self.outstanding_copies(book_id)?)
    }

    /// Waiting list of the book, earliest join first
    pub fn queue_of(&self, book_id: i64) -> AppResult<Vec<&QueueEntry>> {
        Ok(self
            .book(book_id)?
            .queue
            .iter()
            .filter_map(|id| self.queue_entries.get(id))
            .collect())
    }

    pub fn book_details(&self, id: i64) -> AppResult<BookDetails> {
        let book = self.book(id)?;
        let ratings: Vec<f64> = book
            .reviews
            .iter()
            .filter_map(|rid| self.reviews.get(rid))
            .map(|r| f64::from(r.rating))
            .collect();
        let average_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        let author = match book.author_id {
            Some(author_id) => {
                let author = self.author(author_id)?;
                Some(Label {
                    id: author.id,
                    name: author.name.clone(),
                })
            }
            None => None,
        };
        let categories = book
            .categories
            .iter()
            .map(|id| {
                self.category(*id).map(|c| Label {
                    id: c.id,
                    name: c.name.clone(),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(BookDetails {
            id: book.id,
            title: book.title.clone(),
            author,
            categories,
            available_copies: book.available_copies,
            borrowed_copies: self.outstanding_copies(id)?,
            queue_length: book.queue.len(),
            review_count: ratings.len(),
            average_rating,
            created_at: book.created_at,
        })
    }
}
