//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, borrows, categories, health, queue, reviews, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bibliotheca API",
        version = "0.3.0",
        description = "Library lending and reservation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::get_user_borrows,
        users::get_user_queue,
        users::get_user_notifications,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::add_copies,
        books::withdraw_copies,
        // Borrows
        borrows::list_borrows,
        borrows::get_borrow,
        borrows::create_borrow,
        borrows::return_borrow,
        // Queue
        queue::get_book_queue,
        queue::join_queue,
        queue::leave_queue,
        queue::leave_queue_entry,
        // Reviews
        reviews::list_book_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
    ),
    components(
        schemas(
            // Users
            crate::models::user::UserDetails,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::notification::Notification,
            // Authors and categories
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            crate::models::category::UpdateCategory,
            // Books
            crate::models::book::Label,
            crate::models::book::BookDetails,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::CopiesRequest,
            // Borrows
            crate::models::borrow::BorrowOrigin,
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::CreateBorrow,
            crate::models::borrow::ReturnBorrow,
            // Queue
            crate::models::queue::QueueMembership,
            crate::models::queue::JoinQueue,
            // Reviews
            crate::models::review::Review,
            crate::models::review::CreateReview,
            crate::models::review::UpdateReview,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Library members"),
        (name = "authors", description = "Authors"),
        (name = "categories", description = "Subject categories"),
        (name = "books", description = "Catalog and copy management"),
        (name = "borrows", description = "Borrowing and returning"),
        (name = "queue", description = "Reservation queues"),
        (name = "reviews", description = "Book reviews")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
