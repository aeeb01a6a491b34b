//! Borrow endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        borrow::{CreateBorrow, ReturnBorrow},
        BorrowRecord,
    },
    AppState,
};

use super::users::BorrowFilter;

/// List all borrows
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    params(BorrowFilter),
    responses(
        (status = 200, description = "List of borrows", body = Vec<BorrowRecord>)
    )
)]
pub async fn list_borrows(
    State(state): State<AppState>,
    Query(filter): Query<BorrowFilter>,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    let borrows = state.services.lending.list_borrows(filter.active).await?;
    Ok(Json(borrows))
}

/// Get a borrow by ID
#[utoipa::path(
    get,
    path = "/borrows/{id}",
    tag = "borrows",
    params(
        ("id" = i64, Path, description = "Borrow ID")
    ),
    responses(
        (status = 200, description = "Borrow details", body = BorrowRecord),
        (status = 404, description = "Borrow not found")
    )
)]
pub async fn get_borrow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BorrowRecord>> {
    let borrow = state.services.lending.get_borrow(id).await?;
    Ok(Json(borrow))
}

/// Borrow a copy of a book
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowRecord),
        (status = 400, description = "Invalid duration"),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "Borrow limit reached, duplicate borrow, or no copy available")
    )
)]
pub async fn create_borrow(
    State(state): State<AppState>,
    Json(data): Json<CreateBorrow>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    data.validate()?;
    let borrow = state
        .services
        .lending
        .borrow(data.user_id, data.book_id, data.duration_days)
        .await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    params(
        ("id" = i64, Path, description = "Borrow ID")
    ),
    request_body = ReturnBorrow,
    responses(
        (status = 200, description = "Book returned", body = BorrowRecord),
        (status = 403, description = "Borrow belongs to another user"),
        (status = 404, description = "Borrow not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_borrow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Option<Json<ReturnBorrow>>,
) -> AppResult<Json<BorrowRecord>> {
    let acting_user = body.and_then(|Json(data)| data.user_id);
    let borrow = state.services.lending.return_borrow(id, acting_user).await?;
    Ok(Json(borrow))
}
