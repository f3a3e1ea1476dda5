//! Invoice Models

use serde::{Deserialize, Serialize};

use super::job::PaymentStatus;

/// Invoice entity, derived 1:1 from a completed job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    /// Human-facing number, e.g. `INV-00007`
    pub invoice_number: String,
    pub job_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub vehicle_name: String,
    pub subtotal: f64,
    pub discount: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub paid_amount: f64,
    pub balance: f64,
    pub status: PaymentStatus,
    pub issued_at: i64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
}

/// Snapshot of a job service item at invoicing time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub amount: f64,
}
