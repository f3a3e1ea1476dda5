//! Domain services
//!
//! - [`http`] - router assembly and HTTP middleware
//! - [`jobs`] - job lifecycle (creation, stages, materials, deletion)
//! - [`billing`] - invoices and payment settlement
//! - [`stock`] - roll-based inventory deduction
//! - [`scheduling`] - appointment booking and conversion
//! - [`leads`] - price inquiry conversion
//! - [`notify`] - WhatsApp notification outbox

pub mod billing;
pub mod http;
pub mod jobs;
pub mod leads;
pub mod notify;
pub mod scheduling;
pub mod stock;
