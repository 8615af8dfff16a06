//! Order API Handlers
//!
//! Thin wrappers around [`crate::orders::OrderService`], which owns all
//! lifecycle and authorization rules.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{OrderCreate, OrderStatus, OrderStatusUpdate, OrderUpdate};
use crate::utils::{ApiResponse, AppError, AppResult, ok_with};

/// GET /api/order - orders visible to the caller, newest first
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    let orders = state.order_service().list(&user).await?;
    Ok(ok_with(json!({ "orders": orders })))
}

/// GET /api/order/status/:status - filter by status
pub async fn list_by_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(status): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let status: OrderStatus = status.parse().map_err(AppError::Validation)?;
    let orders = state.order_service().list_by_status(&user, status).await?;
    Ok(ok_with(json!({ "orders": orders })))
}

/// POST /api/order/add - place a new order
pub async fn place(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(data): Json<OrderCreate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    data.validate()?;
    let order = state.order_service().place(&user, data).await?;
    Ok(ok_with(json!({ "order": order })))
}

/// PUT /api/order/:id - edit a Pending order
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(data): Json<OrderUpdate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let order = state.order_service().update_fields(&user, &id, data).await?;
    Ok(ok_with(json!({ "order": order })))
}

/// PUT /api/order/:id/status - transition the lifecycle
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(data): Json<OrderStatusUpdate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let order = state.order_service().update_status(&user, &id, data).await?;
    Ok(ok_with(json!({ "order": order })))
}

/// PUT /api/order/:id/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let order = state.order_service().cancel(&user, &id).await?;
    Ok(ok_with(json!({ "order": order })))
}

/// DELETE /api/order/:id - admin only
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    state.order_service().delete(&user, &id).await?;
    Ok(ok_with(json!({ "message": "Order deleted" })))
}

/// GET /api/order/stats - count and revenue grouped by status
pub async fn stats(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    let stats = state.order_service().stats(&user).await?;
    Ok(ok_with(json!({ "stats": stats })))
}
