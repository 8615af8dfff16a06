//! Stockroom — small-business inventory and order management backend
//!
//! REST API over products, categories, suppliers, orders, users and
//! notifications, backed by embedded SurrealDB, with a WebSocket push layer
//! for stock updates, notifications and presence.
//!
//! # Modules
//!
//! - [`core`] - configuration, shared state, HTTP server
//! - [`api`] - axum routers and handlers per resource
//! - [`auth`] - JWT issuance/validation and the request extractor
//! - [`db`] - embedded database, models, repositories
//! - [`orders`] - order lifecycle manager (state machine + inventory deltas)
//! - [`notifications`] - persisted store and derived feed
//! - [`realtime`] - push hub, presence tracker, WebSocket endpoint
//! - [`utils`] - error envelope and logging

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod notifications;
pub mod orders;
pub mod realtime;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};
