//! Health Handler

use axum::Json;
use serde_json::{Value, json};

use crate::utils::{ApiResponse, ok_with};

/// GET /api/health - liveness probe, no auth
pub async fn health() -> Json<ApiResponse<Value>> {
    ok_with(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
