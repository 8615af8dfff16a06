//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{CategoryCreate, CategoryUpdate};
use crate::utils::{ApiResponse, AppError, AppResult, ok_with};

fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if !user.is_admin() {
        return Err(AppError::forbidden("Only admins may manage categories"));
    }
    Ok(())
}

/// GET /api/category
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    let categories = state.categories().find_all().await?;
    Ok(ok_with(json!({ "categories": categories })))
}

/// POST /api/category/add - admin only
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(data): Json<CategoryCreate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    data.validate()?;
    let category = state.categories().create(data).await?;
    Ok(ok_with(json!({ "category": category })))
}

/// PUT /api/category/:id - admin only
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(data): Json<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    let category = state.categories().update(&id, data).await?;
    Ok(ok_with(json!({ "category": category })))
}

/// DELETE /api/category/:id - admin only
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    state.categories().delete(&id).await?;
    Ok(ok_with(json!({ "message": "Category deleted" })))
}
