//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{UserCreate, UserUpdate, UserView};
use crate::db::repository::parse_id;
use crate::utils::{ApiResponse, AppError, AppResult, ok_with};

fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if !user.is_admin() {
        return Err(AppError::forbidden("Only admins may manage users"));
    }
    Ok(())
}

/// Self-or-admin gate; `id` may be the bare key or `user:key`
fn require_self_or_admin(user: &CurrentUser, id: &str) -> AppResult<()> {
    if user.is_admin() {
        return Ok(());
    }
    let target = parse_id("user", id)
        .map_err(|_| AppError::validation(format!("Invalid user id: {}", id)))?;
    if user.id == target.to_string() {
        return Ok(());
    }
    Err(AppError::forbidden("You may only modify your own account"))
}

/// GET /api/user
///
/// Every account with an `is_online` badge derived from the presence
/// tracker at read time.
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    let presence = state.presence();
    let users: Vec<UserView> = state
        .users()
        .find_all()
        .await?
        .into_iter()
        .map(|u| {
            let online = u
                .id
                .as_ref()
                .map(|id| presence.is_online(&id.to_string()))
                .unwrap_or(false);
            UserView::from_user(u, online)
        })
        .collect();

    Ok(ok_with(json!({ "users": users })))
}

/// POST /api/user/add - admin only
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(data): Json<UserCreate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    data.validate()?;
    let created = state.users().create(data).await?;
    Ok(ok_with(json!({ "user": created })))
}

/// PUT /api/user/:id - self or admin; role changes are admin only
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(data): Json<UserUpdate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_self_or_admin(&user, &id)?;
    if data.role.is_some() && !user.is_admin() {
        return Err(AppError::forbidden("Only admins may change roles"));
    }
    let updated = state.users().update(&id, data).await?;
    Ok(ok_with(json!({ "user": updated })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordUpdate {
    #[validate(length(min = 6))]
    pub password: String,
}

/// PUT /api/user/:id/password - self or admin
pub async fn update_password(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(data): Json<PasswordUpdate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_self_or_admin(&user, &id)?;
    data.validate()?;
    state.users().update_password(&id, &data.password).await?;
    Ok(ok_with(json!({ "message": "Password updated" })))
}

/// PUT /api/user/:id/toggle-status - admin only; admins cannot disable
/// themselves
pub async fn toggle_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    let target = parse_id("user", &id)
        .map_err(|_| AppError::validation(format!("Invalid user id: {}", id)))?;
    if user.id == target.to_string() {
        return Err(AppError::conflict("You cannot disable your own account"));
    }
    let updated = state.users().toggle_status(&id).await?;
    Ok(ok_with(json!({ "user": updated })))
}

/// DELETE /api/user/:id - admin only
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    let target = parse_id("user", &id)
        .map_err(|_| AppError::validation(format!("Invalid user id: {}", id)))?;
    if user.id == target.to_string() {
        return Err(AppError::conflict("You cannot delete your own account"));
    }
    state.users().delete(&id).await?;
    Ok(ok_with(json!({ "message": "User deleted" })))
}
