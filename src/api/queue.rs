//! Reservation queue endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{
        queue::{ActingUser, JoinQueue},
        QueueMembership,
    },
    AppState,
};

/// Get the waiting list of a book, head first
#[utoipa::path(
    get,
    path = "/books/{id}/queue",
    tag = "queue",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Queue of the book", body = Vec<QueueMembership>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_queue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<QueueMembership>>> {
    let queue = state.services.queue.book_queue(id).await?;
    Ok(Json(queue))
}

/// Join the queue of a book
#[utoipa::path(
    post,
    path = "/books/{id}/queue",
    tag = "queue",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = JoinQueue,
    responses(
        (status = 201, description = "Queued", body = QueueMembership),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "Copy available, queue limit reached, or already queued")
    )
)]
pub async fn join_queue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<JoinQueue>,
) -> AppResult<(StatusCode, Json<QueueMembership>)> {
    let membership = state.services.queue.join(data.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// Leave the queue of a book
#[utoipa::path(
    delete,
    path = "/books/{book_id}/queue/{user_id}",
    tag = "queue",
    params(
        ("book_id" = i64, Path, description = "Book ID"),
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "Left the queue"),
        (status = 404, description = "Not queued for this book")
    )
)]
pub async fn leave_queue(
    State(state): State<AppState>,
    Path((book_id, user_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.services.queue.leave(user_id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Drop a queue entry; `user_id` must own it
#[utoipa::path(
    delete,
    path = "/queue/{entry_id}",
    tag = "queue",
    params(
        ("entry_id" = i64, Path, description = "Queue entry ID"),
        ActingUser
    ),
    responses(
        (status = 204, description = "Entry removed"),
        (status = 400, description = "Missing user_id"),
        (status = 403, description = "Entry belongs to another user"),
        (status = 404, description = "Entry not found")
    )
)]
pub async fn leave_queue_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
    Query(acting): Query<ActingUser>,
) -> AppResult<StatusCode> {
    let user_id = acting
        .user_id
        .ok_or_else(|| AppError::BadRequest("user_id is required".to_string()))?;
    state.services.queue.leave_entry(user_id, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
