//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Customer and vehicle errors
//! - 2xxx: Job errors
//! - 3xxx: Inventory errors
//! - 4xxx: Invoice errors
//! - 5xxx: Payment errors
//! - 6xxx: Appointment errors
//! - 7xxx: Technician, inquiry and template errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::JobNotFound);
//!
//! let err = AppError::with_message(ErrorCode::InsufficientStock, "Roll R-12 has 1.2 m left")
//!     .with_detail("roll_id", 12);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(3002));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
