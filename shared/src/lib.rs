//! Shared types for the garage back-office
//!
//! Domain models, request payloads, error codes and the API response
//! envelope used by `garage-server` and its HTTP clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
