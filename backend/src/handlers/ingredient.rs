//! HTTP handlers for ingredient inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ingredient::{
    Ingredient, IngredientDetail, IngredientFilter, IngredientListItem, IngredientService,
    IngredientStats, StockAlerts,
};
use crate::AppState;
use shared::{CreateIngredientInput, UpdateIngredientInput, UpdateStockInput};

pub async fn create_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateIngredientInput>,
) -> AppResult<(StatusCode, Json<Ingredient>)> {
    let service = IngredientService::new(state.db);
    let ingredient = service.create(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

/// List ingredients, optionally by category or only those low on stock
pub async fn list_ingredients(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<IngredientFilter>,
) -> AppResult<Json<Vec<IngredientListItem>>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.list(current_user.0.user_id, &filter).await?))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<Json<IngredientDetail>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.get(current_user.0.user_id, ingredient_id).await?))
}

pub async fn update_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Json(input): Json<UpdateIngredientInput>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db);
    let ingredient = service
        .update(current_user.0.user_id, ingredient_id, input)
        .await?;
    Ok(Json(ingredient))
}

pub async fn delete_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = IngredientService::new(state.db);
    service.remove(current_user.0.user_id, ingredient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add or subtract stock
pub async fn update_ingredient_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Json(input): Json<UpdateStockInput>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db);
    let ingredient = service
        .update_stock(current_user.0.user_id, ingredient_id, input)
        .await?;
    Ok(Json(ingredient))
}

pub async fn get_stock_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<StockAlerts>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.stock_alerts(current_user.0.user_id).await?))
}

pub async fn get_ingredient_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<IngredientStats>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.stats(current_user.0.user_id).await?))
}
