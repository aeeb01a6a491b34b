//! Category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        category::{CreateCategory, UpdateCategory},
        Category,
    },
    AppState,
};

/// List categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "List of categories", body = Vec<Category>)
    )
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.services.categories.list().await)
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let category = state.services.categories.get_by_id(id).await?;
    Ok(Json(category))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Name already in use")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(data): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let category = state.services.categories.create(data).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Name already in use")
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    let category = state.services.categories.update(id, data).await?;
    Ok(Json(category))
}

/// Delete a category and untag its books
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
