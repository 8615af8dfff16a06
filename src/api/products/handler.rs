//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{ProductCreate, ProductUpdate};
use crate::realtime::ServerEvent;
use crate::utils::{ApiResponse, AppError, AppResult, ok_with};

fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if !user.is_admin() {
        return Err(AppError::forbidden("Only admins may manage products"));
    }
    Ok(())
}

/// GET /api/product
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    let products = state.products().find_all().await?;
    Ok(ok_with(json!({ "products": products })))
}

/// GET /api/product/low-stock - products at or below their threshold
pub async fn list_low_stock(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    let products = state.products().find_low_stock().await?;
    Ok(ok_with(json!({ "products": products })))
}

/// POST /api/product/add - admin only
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(data): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    data.validate()?;
    let product = state.products().create(data).await?;
    Ok(ok_with(json!({ "product": product })))
}

/// PUT /api/product/:id - admin only
///
/// A manual quantity edit is an inventory delta, so it broadcasts
/// `stock_update` like the order path does.
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(data): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;

    let quantity_changed = data.quantity.is_some();
    let product = state.products().update(&id, data).await?;

    if quantity_changed
        && let Some(pid) = &product.id
    {
        state.hub().broadcast(ServerEvent::StockUpdate {
            product_id: pid.to_string(),
            quantity: product.quantity,
        });
    }

    Ok(ok_with(json!({ "product": product })))
}

/// DELETE /api/product/:id - admin only
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    require_admin(&user)?;
    state.products().delete(&id).await?;
    Ok(ok_with(json!({ "message": "Product deleted" })))
}
