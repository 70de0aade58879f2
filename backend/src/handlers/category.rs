//! HTTP handlers for category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::category::{Category, CategoryService, CategoryWithCounts};
use crate::AppState;
use shared::{CreateCategoryInput, UpdateCategoryInput};

pub async fn list_categories(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<CategoryWithCounts>>> {
    let service = CategoryService::new(state.db);
    Ok(Json(service.list().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<CategoryWithCounts>> {
    let service = CategoryService::new(state.db);
    Ok(Json(service.get(category_id).await?))
}

/// Create a category (admin only)
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    current_user.0.require_admin()?;

    let service = CategoryService::new(state.db);
    let category = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category (admin only)
pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    current_user.0.require_admin()?;

    let service = CategoryService::new(state.db);
    Ok(Json(service.update(category_id, input).await?))
}

/// Delete an unused category (admin only)
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require_admin()?;

    let service = CategoryService::new(state.db);
    service.delete(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
