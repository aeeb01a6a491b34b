//! Repository layer: the in-process entity store
//!
//! Entities live in id-keyed tables and reference each other by id. Each entity
//! module adds its ledger methods to [`Store`]; the methods that create or remove
//! a record also update every reciprocal collection, so no caller ever has to.

pub mod authors;
pub mod books;
pub mod borrows;
pub mod categories;
pub mod notifications;
pub mod queue;
pub mod reviews;
pub mod users;

use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    error::AppResult,
    models::{Author, Book, Borrow, Category, Notification, QueueEntry, Review, User},
};

/// Next id per entity table
#[derive(Debug, Default, Clone)]
struct Sequences {
    users: i64,
    authors: i64,
    categories: i64,
    books: i64,
    borrows: i64,
    queue_entries: i64,
    reviews: i64,
    notifications: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Entity arena
#[derive(Debug, Default, Clone)]
pub struct Store {
    users: IndexMap<i64, User>,
    authors: IndexMap<i64, Author>,
    categories: IndexMap<i64, Category>,
    books: IndexMap<i64, Book>,
    borrows: IndexMap<i64, Borrow>,
    queue_entries: IndexMap<i64, QueueEntry>,
    reviews: IndexMap<i64, Review>,
    notifications: IndexMap<i64, Notification>,
    sequences: Sequences,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Shared handle on the store.
///
/// All access goes through [`Repository::transaction`] or [`Repository::read`],
/// which hold the store lock for the whole closure. Closures are synchronous, so a
/// transaction can never be interleaved with another one.
#[derive(Clone, Default)]
pub struct Repository {
    store: Arc<Mutex<Store>>,
}

impl Repository {
    /// Create a repository over an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a mutating operation with exclusive access to the store.
    ///
    /// The operation works on a copy that replaces the store only when it
    /// returns `Ok`. An `Err` or a panic part way through a multi-step operation
    /// leaves the store as it was.
    pub async fn transaction<T, F>(&self, operation: F) -> AppResult<T>
    where
        F: FnOnce(&mut Store) -> AppResult<T>,
    {
        let mut store = self.store.lock().await;
        let mut draft = store.clone();
        let output = operation(&mut draft)?;
        *store = draft;
        Ok(output)
    }

    /// Run a read-only query against a consistent snapshot of the store
    pub async fn read<T, F>(&self, query: F) -> T
    where
        F: FnOnce(&Store) -> T,
    {
        let store = self.store.lock().await;
        query(&store)
    }
}
