//! API routes
//!
//! - [`health`] - liveness and database check
//! - [`customers`] - customers, vehicles and their job history
//! - [`technicians`] - technician roster
//! - [`inventory`] - items, film rolls and stock adjustments
//! - [`jobs`] - job funnel, payments, materials and invoicing
//! - [`invoices`] - invoice listing and payments
//! - [`appointments`] - bookings and conversion into jobs
//! - [`inquiries`] - price inquiries and conversion into customers
//! - [`templates`] - WhatsApp message templates
//! - [`notifications`] - notification outbox
//! - [`dashboard`] - summary figures

pub mod health;

pub mod customers;
pub mod inquiries;
pub mod technicians;

pub mod appointments;
pub mod inventory;
pub mod jobs;

pub mod invoices;

pub mod notifications;
pub mod templates;

pub mod dashboard;

use shared::error::ErrorCode;

use crate::db::repository::RepoError;
use crate::utils::AppError;

/// Map repository not-found / duplicate errors to resource-specific codes
pub(crate) fn repo_error(not_found: ErrorCode, duplicate: ErrorCode) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::NotFound(msg) => AppError::with_message(not_found, msg),
        RepoError::Duplicate(_) => AppError::new(duplicate),
        other => other.into(),
    }
}
