//! Supplier API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{SupplierCreate, SupplierUpdate};
use crate::utils::{ApiResponse, AppError, AppResult, ok_with};

fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if !user.is_admin() {
        return Err(AppError::forbidden("Only admins may manage suppliers"));
    }
    Ok(())
}

/// GET /api/supplier
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    let suppliers = state.suppliers().find_all().await?;
    Ok(ok_with(json!({ "suppliers": suppliers })))
}

/// POST /api/supplier/add - admin only
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(data): Json<SupplierCreate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    data.validate()?;
    let supplier = state.suppliers().create(data).await?;
    Ok(ok_with(json!({ "supplier": supplier })))
}

/// PUT /api/supplier/:id - admin only
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(data): Json<SupplierUpdate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    let supplier = state.suppliers().update(&id, data).await?;
    Ok(ok_with(json!({ "supplier": supplier })))
}

/// DELETE /api/supplier/:id - admin only
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    state.suppliers().delete(&id).await?;
    Ok(ok_with(json!({ "message": "Supplier deleted" })))
}
