//! Product API Module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/product", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/add", post(handler::create))
        .route("/low-stock", get(handler::list_low_stock))
        .route("/{id}", put(handler::update).delete(handler::delete))
}
