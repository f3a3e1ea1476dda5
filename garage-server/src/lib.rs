//! Garage Server - CRM / ERP backend for a detailing and PPF workshop
//!
//! # Overview
//!
//! - **Customers** (`api/customers`): customers with vehicles and PPF preferences
//! - **Jobs** (`services/jobs`): stage funnel, service items, materials, payments
//! - **Inventory** (`services/stock`): unit and roll-based stock with FIFO roll deduction
//! - **Billing** (`services/billing`): invoice generation and payment settlement
//! - **Scheduling** (`services/scheduling`): appointments with technician overlap checks
//! - **Leads** (`services/leads`): price inquiries converted into customers
//! - **Notifications** (`services/notify`): WhatsApp template outbox
//!
//! # Layout
//!
//! ```text
//! garage-server/src/
//! ├── core/          # config, state, server
//! ├── api/           # HTTP routes and handlers
//! ├── services/      # domain workflows and the HTTP stack
//! ├── db/            # SQLite pool, migrations, repositories
//! └── utils/         # logging, validation, money
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger_with_file;
