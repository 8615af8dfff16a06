//! Notification API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::NotificationCreate;
use crate::db::repository::parse_id;
use crate::utils::{ApiResponse, AppError, AppResult, ok_with};

/// GET /api/notifications/:user_id
///
/// Feed for one recipient. Admins may read anyone's feed and additionally
/// get the derived (low-stock, pending-orders) entries.
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let requested = parse_id("user", &user_id)
        .map_err(|_| AppError::validation(format!("Invalid user id: {}", user_id)))?;
    if !user.is_admin() && user.id != requested.to_string() {
        return Err(AppError::forbidden(
            "You may only read your own notifications",
        ));
    }

    let feed = state
        .notification_service()
        .list_feed(&user_id, user.is_admin())
        .await?;
    Ok(ok_with(json!({ "notifications": feed })))
}

/// POST /api/notifications - admin only; sender is the acting admin
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(data): Json<NotificationCreate>,
) -> AppResult<Json<ApiResponse<Value>>> {
    if !user.is_admin() {
        return Err(AppError::forbidden("Only admins may send notifications"));
    }

    let sender = parse_id("user", &user.id)
        .map_err(|_| AppError::internal(format!("Malformed actor id: {}", user.id)))?;
    let notification = state
        .notification_service()
        .create_for(&data.recipient, sender, data.notification_type, data.message)
        .await?;
    Ok(ok_with(json!({ "notification": notification })))
}

/// PUT /api/notifications/:id/read - idempotent; derived ids are a no-op
pub async fn mark_read(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    state.notification_service().mark_read(&id).await?;
    Ok(ok_with(json!({ "message": "Notification marked as read" })))
}
