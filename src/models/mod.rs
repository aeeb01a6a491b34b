//! Data models for Bibliotheca

pub mod author;
pub mod book;
pub mod borrow;
pub mod category;
pub mod notification;
pub mod queue;
pub mod review;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookDetails, Label};
pub use borrow::{Borrow, BorrowOrigin, BorrowRecord};
pub use category::Category;
pub use notification::{Notification, Recipient};
pub use queue::{QueueEntry, QueueMembership};
pub use review::Review;
pub use user::{User, UserDetails};
