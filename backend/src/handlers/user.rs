//! HTTP handlers for user account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::user::{UserAccount, UserService, UserStats};
use crate::AppState;
use shared::{ChangePasswordInput, UpdateProfileInput, UpdateUserInput};

/// List every account (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<UserAccount>>> {
    current_user.0.require_admin()?;

    let service = UserService::new(state.db);
    Ok(Json(service.list().await?))
}

/// Get an account. Users may read their own; admins may read any.
pub async fn get_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserAccount>> {
    current_user.0.require_self_or_admin(user_id)?;

    let service = UserService::new(state.db);
    Ok(Json(service.get(user_id).await?))
}

pub async fn get_own_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserAccount>> {
    let service = UserService::new(state.db);
    Ok(Json(service.get(current_user.0.user_id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Json<UserAccount>> {
    let service = UserService::new(state.db);
    Ok(Json(service.update_profile(current_user.0.user_id, input).await?))
}

pub async fn get_user_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserStats>> {
    let service = UserService::new(state.db);
    Ok(Json(service.stats(current_user.0.user_id).await?))
}

pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<StatusCode> {
    let service = UserService::new(state.db);
    service.change_password(current_user.0.user_id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Update any account, including role and active flag (admin only)
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<UserAccount>> {
    current_user.0.require_admin()?;

    let service = UserService::new(state.db);
    Ok(Json(service.update_user(current_user.0.user_id, user_id, input).await?))
}

/// Deactivate an account (admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require_admin()?;

    let service = UserService::new(state.db);
    service.deactivate(current_user.0.user_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
