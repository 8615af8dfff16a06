//! API Routes
//!
//! One module per resource, each exposing a `router()` in the same shape:
//!
//! - [`health`] - liveness probe
//! - [`auth`] - login / logout
//! - [`orders`] - order lifecycle endpoints
//! - [`products`] - product CRUD
//! - [`categories`] - category CRUD
//! - [`suppliers`] - supplier CRUD
//! - [`notifications`] - notification feed + read state
//! - [`users`] - account management
//! - [`dashboard`] - admin summary aggregation

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod users;

use axum::Router;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(orders::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(suppliers::router())
        .merge(notifications::router())
        .merge(users::router())
        .merge(dashboard::router())
}
