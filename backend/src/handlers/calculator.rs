//! HTTP handlers for recipe costing endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::CalculatorService;
use crate::AppState;
use shared::costing::{IngredientUsage, MarginAnalysis, RecipeCostSummary, SimulationResult};
use shared::SimulationInput;

/// Recalculate and persist a recipe's costs
pub async fn calculate_recipe_costs(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<RecipeCostSummary>> {
    let service = CalculatorService::new(state.db);
    let summary = service
        .calculate_recipe_costs(current_user.0.user_id, recipe_id)
        .await?;
    Ok(Json(summary))
}

/// Cost a hypothetical recipe without saving anything
pub async fn simulate_recipe_cost(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SimulationInput>,
) -> AppResult<Json<SimulationResult>> {
    let service = CalculatorService::new(state.db);
    let result = service
        .simulate_recipe_cost(current_user.0.user_id, input)
        .await?;
    Ok(Json(result))
}

/// How much of an ingredient the user's recipes consume
pub async fn get_ingredient_usage(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<Json<IngredientUsage>> {
    let service = CalculatorService::new(state.db);
    let usage = service
        .calculate_ingredient_usage(ingredient_id, current_user.0.user_id)
        .await?;
    Ok(Json(usage))
}

pub async fn get_margin_analysis(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<MarginAnalysis>> {
    let service = CalculatorService::new(state.db);
    Ok(Json(service.get_margin_analysis(current_user.0.user_id).await?))
}
