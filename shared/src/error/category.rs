//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Customer errors
/// - 2xxx: Job errors
/// - 3xxx: Inventory errors
/// - 4xxx: Invoice errors
/// - 5xxx: Payment errors
/// - 6xxx: Appointment errors
/// - 7xxx: CRM errors (technicians, inquiries, templates)
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Customer,
    Job,
    Inventory,
    Invoice,
    Payment,
    Appointment,
    Crm,
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            1000..2000 => Self::Customer,
            2000..3000 => Self::Job,
            3000..4000 => Self::Inventory,
            4000..5000 => Self::Invoice,
            5000..6000 => Self::Payment,
            6000..7000 => Self::Appointment,
            7000..8000 => Self::Crm,
            9000..=u16::MAX => Self::System,
            _ => Self::General,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Customer => "customer",
            Self::Job => "job",
            Self::Inventory => "inventory",
            Self::Invoice => "invoice",
            Self::Payment => "payment",
            Self::Appointment => "appointment",
            Self::Crm => "crm",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
