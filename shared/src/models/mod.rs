//! Data models
//!
//! Shared between garage-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod appointment;
pub mod customer;
pub mod dashboard;
pub mod inquiry;
pub mod inventory;
pub mod invoice;
pub mod job;
pub mod notification;
pub mod technician;
pub mod template;

// Re-exports
pub use appointment::*;
pub use customer::*;
pub use dashboard::*;
pub use inquiry::*;
pub use inventory::*;
pub use invoice::*;
pub use job::*;
pub use notification::*;
pub use technician::*;
pub use template::*;
