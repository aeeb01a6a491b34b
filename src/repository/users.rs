//! User borrow ledger

use chrono::{DateTime, Utc};

use super::{next, Store};
use crate::{
    error::{AppError, AppResult},
    models::{
        user::{CreateUser, UpdateUser, UserDetails},
        Borrow, Recipient, User,
    },
};

impl Store {
    /// Get user by ID
    pub fn user(&self, id: i64) -> AppResult<&User> {
        self.users
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub(super) fn user_mut(&mut self, id: i64) -> AppResult<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// All users in registration order
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    fn check_username(&self, username: &str, except: Option<i64>) -> AppResult<()> {
        if self
            .users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
        {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }
        Ok(())
    }

    fn check_email(&self, email: &str, except: Option<i64>) -> AppResult<()> {
        if self
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != except)
        {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }
        Ok(())
    }

    /// Register a new user; usernames and emails are unique
    pub fn insert_user(&mut self, data: &CreateUser, now: DateTime<Utc>) -> AppResult<i64> {
        self.check_username(&data.username, None)?;
        self.check_email(&data.email, None)?;

        let id = next(&mut self.sequences.users);
        self.users.insert(
            id,
            User {
                id,
                username: data.username.clone(),
                email: data.email.clone(),
                firstname: data.firstname.clone(),
                lastname: data.lastname.clone(),
                created_at: now,
                borrows: Vec::new(),
                queue_entries: Vec::new(),
                reviews: Vec::new(),
                notifications: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Change profile fields; absent fields are left unchanged
    pub(crate) fn update_user(&mut self, id: i64, data: &UpdateUser) -> AppResult<()> {
        self.user(id)?;
        if let Some(username) = &data.username {
            self.check_username(username, Some(id))?;
        }
        if let Some(email) = &data.email {
            self.check_email(email, Some(id))?;
        }

        let user = self.user_mut(id)?;
        if let Some(username) = &data.username {
            user.username = username.clone();
        }
        if let Some(email) = &data.email {
            user.email = email.clone();
        }
        if data.firstname.is_some() {
            user.firstname = data.firstname.clone();
        }
        if data.lastname.is_some() {
            user.lastname = data.lastname.clone();
        }
        Ok(())
    }

    /// Delete a user with their queue entries, reviews, borrow history and
    /// notifications, and unlink them from the books involved
    pub(crate) fn remove_user(&mut self, id: i64) -> AppResult<User> {
        let user = self
            .users
            .shift_remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        for entry_id in &user.queue_entries {
            if let Some(entry) = self.queue_entries.shift_remove(entry_id) {
                if let Some(book) = self.books.get_mut(&entry.book_id) {
                    book.queue.retain(|e| e != entry_id);
                }
            }
        }
        for review_id in &user.reviews {
            if let Some(review) = self.reviews.shift_remove(review_id) {
                if let Some(book) = self.books.get_mut(&review.book_id) {
                    book.reviews.retain(|r| r != review_id);
                }
            }
        }
        for borrow_id in &user.borrows {
            if let Some(borrow) = self.borrows.shift_remove(borrow_id) {
                if let Some(book) = self.books.get_mut(&borrow.book_id) {
                    book.borrows.retain(|b| b != borrow_id);
                }
            }
        }
        for notification_id in &user.notifications {
            self.notifications.shift_remove(notification_id);
        }
        Ok(user)
    }

    /// Every borrow of the user, oldest first
    pub fn borrows_of(&self, user_id: i64) -> AppResult<Vec<&Borrow>> {
        let user = self.user(user_id)?;
        Ok(user
            .borrows
            .iter()
            .filter_map(|id| self.borrows.get(id))
            .collect())
    }

    /// Borrows of the user that are not returned yet
    pub fn active_borrows_of(&self, user_id: i64) -> AppResult<Vec<&Borrow>> {
        Ok(self
            .borrows_of(user_id)?
            .into_iter()
            .filter(|b| !b.is_returned())
            .collect())
    }

    pub fn active_borrow_count(&self, user_id: i64) -> AppResult<usize> {
        Ok(self.active_borrows_of(user_id)?.len())
    }

    /// Whether the user currently holds a copy of the book
    pub fn has_active_borrow(&self, user_id: i64, book_id: i64) -> AppResult<bool> {
        Ok(self
            .active_borrows_of(user_id)?
            .iter()
            .any(|b| b.book_id == book_id))
    }

    /// Whether the user ever borrowed the book, returned or not
    pub fn has_borrowed(&self, user_id: i64, book_id: i64) -> AppResult<bool> {
        Ok(self.borrows_of(user_id)?.iter().any(|b| b.book_id == book_id))
    }

    pub fn queue_membership_count(&self, user_id: i64) -> AppResult<usize> {
        Ok(self.user(user_id)?.queue_entries.len())
    }

    pub fn user_details(&self, id: i64) -> AppResult<UserDetails> {
        let user = self.user(id)?;
        Ok(UserDetails {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            created_at: user.created_at,
            active_borrows: self.active_borrow_count(id)?,
            total_borrows: user.borrows.len(),
            queue_memberships: user.queue_entries.len(),
            reviews: user.reviews.len(),
        })
    }

    /// Delivery target for notifications addressed to the user
    pub fn recipient(&self, user_id: i64) -> AppResult<Recipient> {
        let user = self.user(user_id)?;
        Ok(Recipient {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        })
    }
}
