//! User API Module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/user", user_routes())
}

fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/add", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/password", put(handler::update_password))
        .route("/{id}/toggle-status", put(handler::toggle_status))
}
