//! Price Inquiry Models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum InquiryStatus {
    New,
    Contacted,
    Quoted,
    Converted,
    Closed,
}

/// Price inquiry (lead) entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PriceInquiry {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub service_type: String,
    pub message: Option<String>,
    pub quoted_price: Option<f64>,
    pub status: InquiryStatus,
    /// Set once the lead became a customer
    pub customer_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryCreate {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub service_type: String,
    pub message: Option<String>,
    pub quoted_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InquiryUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub service_type: Option<String>,
    pub message: Option<String>,
    pub quoted_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryStatusChange {
    pub status: InquiryStatus,
}

/// Result of converting an inquiry into a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryConversion {
    pub inquiry: PriceInquiry,
    pub customer_id: i64,
    /// `false` when an existing customer matched the phone number
    pub customer_created: bool,
}
