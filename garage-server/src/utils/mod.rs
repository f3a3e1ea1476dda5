//! Utility module - shared error types and helpers
//!
//! - [`AppError`] - application error (from shared::error)
//! - [`ApiResponse`] - response envelope (from shared::error)
//! - logging, validation and money helpers

pub mod logger;
pub mod money;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
