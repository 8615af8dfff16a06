//! Dashboard Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok_with};

#[derive(Deserialize)]
struct CountRow {
    count: i64,
}

#[derive(Deserialize)]
struct ValueRow {
    value: f64,
}

async fn table_count(state: &ServerState, table: &str) -> AppResult<i64> {
    let mut result = state
        .db
        .query(format!("SELECT count() AS count FROM {} GROUP ALL", table))
        .await?;
    let row: Option<CountRow> = result.take(0)?;
    Ok(row.map(|r| r.count).unwrap_or(0))
}

/// GET /api/dashboard/summary - admin only
///
/// Headline numbers for the admin dashboard: entity counts, total
/// inventory value, low-stock products, revenue grouped by order status.
pub async fn summary(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    if !user.is_admin() {
        return Err(AppError::forbidden("Only admins may view the dashboard"));
    }

    let product_count = table_count(&state, "product").await?;
    let order_count = table_count(&state, "orders").await?;
    let user_count = table_count(&state, "user").await?;

    let mut result = state
        .db
        .query("SELECT math::sum(price * quantity) AS value FROM product GROUP ALL")
        .await?;
    let inventory_value: Option<ValueRow> = result.take(0)?;

    let low_stock = state.products().find_low_stock().await?;
    let revenue_by_status = state.order_service().stats(&user).await?;

    Ok(ok_with(json!({
        "summary": {
            "products": product_count,
            "orders": order_count,
            "users": user_count,
            "inventory_value": inventory_value.map(|r| r.value).unwrap_or(0.0),
            "low_stock": low_stock,
            "revenue_by_status": revenue_by_status,
        },
    })))
}
