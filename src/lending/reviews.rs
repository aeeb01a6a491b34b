//! Review ledger rules

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        review::{MAX_RATING, MIN_RATING},
        Review,
    },
    repository::Store,
};

fn check_rating(rating: u8) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::Validation(format!(
            "Rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, rating
        )));
    }
    Ok(())
}

/// Record a user's review of a book they borrowed at some point
pub fn add_review(
    store: &mut Store,
    user_id: i64,
    book_id: i64,
    rating: u8,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> AppResult<i64> {
    check_rating(rating)?;
    let user = store.user(user_id)?;
    let book = store.book(book_id)?;

    if !store.has_borrowed(user_id, book_id)? {
        return Err(AppError::Conflict(format!(
            "User '{}' hasn't borrowed book '{}'",
            user.username, book.title
        )));
    }

    if store.review_by(user_id, book_id)?.is_some() {
        return Err(AppError::Conflict(format!(
            "User '{}' has already reviewed book '{}'",
            user.username, book.title
        )));
    }

    let review_id = store.insert_review(user_id, book_id, rating, comment, now)?;
    tracing::info!(review_id, user_id, book_id, rating, "Review added");
    Ok(review_id)
}

/// Change the rating or comment of the user's own review
pub fn update_review(
    store: &mut Store,
    user_id: i64,
    review_id: i64,
    rating: Option<u8>,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> AppResult<Review> {
    if let Some(rating) = rating {
        check_rating(rating)?;
    }
    store.user(user_id)?;
    if store.review(review_id)?.user_id != user_id {
        return Err(AppError::State(format!(
            "Review {} belongs to another user",
            review_id
        )));
    }

    let review = store.update_review(review_id, rating, comment, now)?.clone();
    tracing::info!(review_id, user_id, "Review updated");
    Ok(review)
}

/// Delete a review; `acting_user` defaults to its author
pub fn delete_review(store: &mut Store, acting_user: Option<i64>, review_id: i64) -> AppResult<Review> {
    let review = store.review(review_id)?;
    if let Some(actor) = acting_user {
        store.user(actor)?;
        if review.user_id != actor {
            return Err(AppError::State(format!(
                "Review {} belongs to another user",
                review_id
            )));
        }
    }

    let review = store.remove_review(review_id)?;
    tracing::info!(review_id, user_id = review.user_id, book_id = review.book_id, "Review deleted");
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lending::{borrow_book, fixtures::*, return_book},
        models::BorrowOrigin,
    };

    fn reader_of(store: &mut Store, name: &str, book: i64) -> i64 {
        let user = add_user(store, name);
        borrow_book(store, &rules(), user, book, 14, BorrowOrigin::Direct, at(1)).unwrap();
        user
    }

    #[test]
    fn test_review_requires_a_borrow() {
        let mut store = Store::new();
        let alice = add_user(&mut store, "alice");
        let book = add_book(&mut store, "Dune", 1);

        let err = add_review(&mut store, alice, book, 4, None, at(2)).unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("hasn't borrowed")));
        assert!(store.reviews_of_book(book).unwrap().is_empty());
        assert!(store.user(alice).unwrap().reviews.is_empty());
    }

    #[test]
    fn test_returned_borrow_still_counts() {
        let mut store = Store::new();
        let book = add_book(&mut store, "Dune", 1);
        let alice = reader_of(&mut store, "alice", book);
        let borrow_id = store.user(alice).unwrap().borrows[0];
        return_book(&mut store, None, borrow_id, at(3)).unwrap();

        let id = add_review(&mut store, alice, book, 5, Some("Spice!".into()), at(4)).unwrap();

        assert_eq!(store.user(alice).unwrap().reviews, vec![id]);
        assert_eq!(store.book(book).unwrap().reviews, vec![id]);
        assert_eq!(store.book_details(book).unwrap().average_rating, Some(5.0));
    }

    #[test]
    fn test_one_review_per_book() {
        let mut store = Store::new();
        let book = add_book(&mut store, "Dune", 1);
        let alice = reader_of(&mut store, "alice", book);
        add_review(&mut store, alice, book, 3, None, at(2)).unwrap();

        let err = add_review(&mut store, alice, book, 4, None, at(3)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("already reviewed")));
    }

    #[test]
    fn test_rating_out_of_range() {
        let mut store = Store::new();
        let book = add_book(&mut store, "Dune", 1);
        let alice = reader_of(&mut store, "alice", book);

        assert!(matches!(add_review(&mut store, alice, book, 0, None, at(2)), Err(AppError::Validation(_))));
        assert!(matches!(add_review(&mut store, alice, book, 6, None, at(2)), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_and_delete_check_ownership() {
        let mut store = Store::new();
        let book = add_book(&mut store, "Dune", 2);
        let alice = reader_of(&mut store, "alice", book);
        let bob = reader_of(&mut store, "bob", book);
        let id = add_review(&mut store, alice, book, 2, None, at(2)).unwrap();

        let err = update_review(&mut store, bob, id, Some(1), None, at(3)).unwrap_err();
        assert!(matches!(err, AppError::State(_)));
        let err = delete_review(&mut store, Some(bob), id).unwrap_err();
        assert!(matches!(err, AppError::State(_)));

        let updated = update_review(&mut store, alice, id, Some(4), Some("Better on reread".into()), at(4)).unwrap();
        assert_eq!(updated.rating, 4);
        assert_eq!(updated.updated_at, Some(at(4)));

        delete_review(&mut store, Some(alice), id).unwrap();
        assert!(store.user(alice).unwrap().reviews.is_empty());
        assert!(store.book(book).unwrap().reviews.is_empty());
        assert!(matches!(store.review(id), Err(AppError::NotFound(_))));
    }
}
