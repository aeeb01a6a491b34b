//! Catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{BookDetails, CopiesRequest, CreateBook, UpdateBook},
    AppState,
};

/// List books in the catalog
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "List of books", body = Vec<BookDetails>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookDetails>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Add a title to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookDetails),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Title already in the catalog")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(data): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookDetails>)> {
    let book = state.services.catalog.create_book(data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Edit a book; a new `available_copies` restocks or withdraws
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book, author or category not found"),
        (status = 409, description = "Title taken or copies not on the shelf")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateBook>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.update_book(id, data).await?;
    Ok(Json(book))
}

/// Remove a book from the catalog
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted, waiting users notified"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Copies still lent out")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Put new copies on the shelf; queued users are served first
#[utoipa::path(
    post,
    path = "/books/{id}/copies",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = CopiesRequest,
    responses(
        (status = 200, description = "Copies added", body = BookDetails),
        (status = 400, description = "Invalid count"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn add_copies(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<CopiesRequest>,
) -> AppResult<Json<BookDetails>> {
    data.validate()?;
    let book = state.services.catalog.add_copies(id, data.count).await?;
    Ok(Json(book))
}

/// Take shelf copies out of circulation
#[utoipa::path(
    post,
    path = "/books/{id}/copies/withdraw",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = CopiesRequest,
    responses(
        (status = 200, description = "Copies withdrawn", body = BookDetails),
        (status = 400, description = "Invalid count"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Not enough copies on the shelf")
    )
)]
pub async fn withdraw_copies(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<CopiesRequest>,
) -> AppResult<Json<BookDetails>> {
    data.validate()?;
    let book = state.services.catalog.withdraw_copies(id, data.count).await?;
    Ok(Json(book))
}
