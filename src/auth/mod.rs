//! Authentication
//!
//! JWT + Argon2 based authentication:
//! - [`jwt`] - token service and claims
//! - [`extractor`] - axum extractor injecting [`CurrentUser`]

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
