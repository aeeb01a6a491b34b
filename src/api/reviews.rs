//! Review endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        queue::ActingUser,
        review::{CreateReview, UpdateReview},
        Review,
    },
    AppState,
};

/// List reviews of a book
#[utoipa::path(
    get,
    path = "/books/{id}/reviews",
    tag = "reviews",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Reviews of the book", body = Vec<Review>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_book_reviews(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = state.services.reviews.book_reviews(id).await?;
    Ok(Json(reviews))
}

/// Get a review by ID
#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = "reviews",
    params(
        ("id" = i64, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review", body = Review),
        (status = 404, description = "Review not found")
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Review>> {
    let review = state.services.reviews.get(id).await?;
    Ok(Json(review))
}

/// Review a book the user has borrowed
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "reviews",
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid rating"),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "Book never borrowed or already reviewed")
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    Json(data): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state.services.reviews.add(data).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Edit a review
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    tag = "reviews",
    params(
        ("id" = i64, Path, description = "Review ID")
    ),
    request_body = UpdateReview,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 400, description = "Invalid rating"),
        (status = 403, description = "Review written by another user"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateReview>,
) -> AppResult<Json<Review>> {
    let review = state.services.reviews.update(id, data).await?;
    Ok(Json(review))
}

/// Delete a review
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "reviews",
    params(
        ("id" = i64, Path, description = "Review ID"),
        ActingUser
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Review written by another user"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(acting): Query<ActingUser>,
) -> AppResult<StatusCode> {
    state.services.reviews.delete(id, acting.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
