//! User endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        user::{CreateUser, UpdateUser},
        BorrowRecord, Notification, QueueMembership, UserDetails},
    AppState,
};

/// Borrow listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BorrowFilter {
    /// Only unreturned borrows
    #[serde(default)]
    pub active: bool,
}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "List of users", body = Vec<UserDetails>)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserDetails>>> {
    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserDetails),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserDetails>> {
    let user = state.services.users.get_by_id(id).await?;
    Ok(Json(user))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserDetails),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already in use")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(data): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserDetails>)> {
    let user = state.services.users.create(data).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user's profile
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserDetails),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already in use")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateUser>,
) -> AppResult<Json<UserDetails>> {
    let user = state.services.users.update(id, data).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User still holds books")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the borrows of a user
#[utoipa::path(
    get,
    path = "/users/{id}/borrows",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID"),
        BorrowFilter
    ),
    responses(
        (status = 200, description = "User's borrows", body = Vec<BorrowRecord>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_borrows(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(filter): Query<BorrowFilter>,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    let borrows = state.services.lending.user_borrows(id, filter.active).await?;
    Ok(Json(borrows))
}

/// Get the queues a user waits in
#[utoipa::path(
    get,
    path = "/users/{id}/queue",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's queue memberships", body = Vec<QueueMembership>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_queue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<QueueMembership>>> {
    let entries = state.services.queue.user_queue(id).await?;
    Ok(Json(entries))
}

/// Get the notifications of a user
#[utoipa::path(
    get,
    path = "/users/{id}/notifications",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's notifications", body = Vec<Notification>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_notifications(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state.services.notifications.list_for_user(id).await?;
    Ok(Json(notifications))
}
