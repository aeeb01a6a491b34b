//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A title and its shelf of lendable copies
#[derive(Debug, Clone)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: Option<i64>,
    pub categories: Vec<i64>,
    /// Copies on the shelf, not lent out
    pub available_copies: u32,
    pub created_at: DateTime<Utc>,
    pub borrows: Vec<i64>,
    /// Queue entry ids, earliest join first
    pub queue: Vec<i64>,
    pub reviews: Vec<i64>,
}

/// Id and display name of a linked author or category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Label {
    pub id: i64,
    pub name: String,
}

/// Book with circulation figures for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    pub id: i64,
    pub title: String,
    pub author: Option<Label>,
    pub categories: Vec<Label>,
    pub available_copies: u32,
    /// Copies currently lent out
    pub borrowed_copies: u32,
    pub queue_length: usize,
    pub review_count: usize,
    pub average_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 512, message = "Title must not be empty"))]
    pub title: String,
    pub author_id: Option<i64>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub available_copies: u32,
}

/// Update book request; absent fields are left unchanged.
///
/// `available_copies` sets the shelf count: raising it restocks and serves the
/// queue, lowering it withdraws shelf copies.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 512, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub author_id: Option<i64>,
    pub category_ids: Option<Vec<i64>>,
    pub available_copies: Option<u32>,
}

/// Add or withdraw shelf copies
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CopiesRequest {
    #[validate(range(min = 1, message = "Count must be at least 1"))]
    pub count: u32,
}
