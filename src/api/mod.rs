//! API handlers for Bibliotheca REST endpoints

pub mod authors;
pub mod books;
pub mod borrows;
pub mod categories;
pub mod health;
pub mod openapi;
pub mod queue;
pub mod reviews;
pub mod users;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/:id/borrows", get(users::get_user_borrows))
        .route("/users/:id/queue", get(users::get_user_queue))
        .route("/users/:id/notifications", get(users::get_user_notifications))
        // Authors and categories
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/copies", post(books::add_copies))
        .route("/books/:id/copies/withdraw", post(books::withdraw_copies))
        .route("/books/:id/reviews", get(reviews::list_book_reviews))
        // Reservation queue
        .route("/books/:id/queue", get(queue::get_book_queue).post(queue::join_queue))
        .route("/books/:book_id/queue/:user_id", delete(queue::leave_queue))
        .route("/queue/:entry_id", delete(queue::leave_queue_entry))
        // Borrows
        .route("/borrows", get(borrows::list_borrows).post(borrows::create_borrow))
        .route("/borrows/:id", get(borrows::get_borrow))
        .route("/borrows/:id/return", post(borrows::return_borrow))
        // Reviews
        .route("/reviews", post(reviews::create_review))
        .route(
            "/reviews/:id",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
