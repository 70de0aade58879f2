//! HTTP handlers for recipe endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::recipe::{
    RecipeFilter, RecipeListItem, RecipeService, RecipeStats, RecipeWithIngredients,
};
use crate::AppState;
use shared::{CreateRecipeInput, UpdateRecipeInput};

/// Create a recipe; its costs are calculated before responding
pub async fn create_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateRecipeInput>,
) -> AppResult<(StatusCode, Json<RecipeWithIngredients>)> {
    let service = RecipeService::new(state.db);
    let recipe = service.create(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn list_recipes(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<RecipeFilter>,
) -> AppResult<Json<Vec<RecipeListItem>>> {
    let service = RecipeService::new(state.db);
    Ok(Json(service.list(current_user.0.user_id, &filter).await?))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<RecipeWithIngredients>> {
    let service = RecipeService::new(state.db);
    Ok(Json(service.get(current_user.0.user_id, recipe_id).await?))
}

/// Update a recipe and recalculate its costs
pub async fn update_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
    Json(input): Json<UpdateRecipeInput>,
) -> AppResult<Json<RecipeWithIngredients>> {
    let service = RecipeService::new(state.db);
    let recipe = service
        .update(current_user.0.user_id, recipe_id, input)
        .await?;
    Ok(Json(recipe))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = RecipeService::new(state.db);
    service.remove(current_user.0.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_recipe_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<RecipeStats>> {
    let service = RecipeService::new(state.db);
    Ok(Json(service.stats(current_user.0.user_id).await?))
}
