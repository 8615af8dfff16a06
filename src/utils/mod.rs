//! Shared utilities
//!
//! - [`error`] - application error type and response envelope
//! - [`logger`] - tracing subscriber setup

pub mod error;
pub mod logger;

pub use error::{ApiResponse, AppError, AppResult, ok_with};
pub use logger::init_logger_with_file;
