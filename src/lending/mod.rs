//! Lending and reservation coordination
//!
//! Every function here takes the store by `&mut` and is meant to run inside a
//! single [`Repository::transaction`](crate::repository::Repository::transaction).
//! Each one validates all of its preconditions before the first mutation, so a
//! returned error always leaves the store untouched.

pub mod borrowing;
pub mod copies;
pub mod queue;
pub mod removal;
pub mod reviews;
pub mod sweep;

pub use borrowing::{borrow_book, return_book};
pub use copies::{restock, set_shelf_copies, withdraw};
pub use queue::{join_queue, leave_queue, leave_queue_for_book};
pub use removal::{close_account, retire_book};
pub use reviews::{add_review, delete_review, update_review};
pub use sweep::{sweep, SweepReport};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::{
        config::LendingConfig,
        models::{book::CreateBook, user::CreateUser},
        repository::Store,
    };

    pub fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 10, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    pub fn rules() -> LendingConfig {
        LendingConfig::default()
    }

    pub fn add_user(store: &mut Store, username: &str) -> i64 {
        store
            .insert_user(
                &CreateUser {
                    username: username.to_string(),
                    email: format!("{}@example.org", username),
                    firstname: None,
                    lastname: None,
                },
                at(0),
            )
            .unwrap()
    }

    pub fn add_book(store: &mut Store, title: &str, copies: u32) -> i64 {
        store
            .insert_book(
                &CreateBook {
                    title: title.to_string(),
                    author_id: None,
                    category_ids: Vec::new(),
                    available_copies: copies,
                },
                at(0),
            )
            .unwrap()
    }
}
