//! Unified error codes for the garage back-office
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Customer and vehicle errors
//! - 2xxx: Job errors
//! - 3xxx: Inventory errors
//! - 4xxx: Invoice errors
//! - 5xxx: Payment errors
//! - 6xxx: Appointment errors
//! - 7xxx: Technician, inquiry and template errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can switch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Business rule violation
    BusinessRuleViolation = 9,

    // ==================== 1xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 1001,
    /// Another customer already uses this phone number
    CustomerPhoneExists = 1002,
    /// Customer still has jobs
    CustomerHasJobs = 1003,
    /// Vehicle not found
    VehicleNotFound = 1101,
    /// Vehicle belongs to a different customer
    VehicleNotOwned = 1102,
    /// Vehicle still has jobs
    VehicleHasJobs = 1103,

    // ==================== 2xxx: Job ====================
    /// Job not found
    JobNotFound = 2001,
    /// Job is completed or cancelled
    JobStageLocked = 2002,
    /// Job is already in the requested stage
    JobStageUnchanged = 2003,
    /// Job already has an invoice
    JobHasInvoice = 2004,
    /// Job is not completed yet
    JobNotCompleted = 2005,
    /// New job total is below the amount already paid
    JobTotalBelowPaid = 2006,
    /// Service item is invalid
    ServiceItemInvalid = 2007,
    /// Job material record not found
    MaterialNotFound = 2101,

    // ==================== 3xxx: Inventory ====================
    /// Inventory item not found
    InventoryItemNotFound = 3001,
    /// Not enough stock for the requested usage
    InsufficientStock = 3002,
    /// Inventory item is referenced by job materials
    InventoryItemInUse = 3003,
    /// Usage unit does not fit the item
    UnitMismatch = 3004,
    /// SKU already used by another item
    SkuExists = 3005,
    /// Roll not found
    RollNotFound = 3101,
    /// Roll has no film left
    RollDepleted = 3102,
    /// Roll has already been cut from
    RollInUse = 3103,

    // ==================== 4xxx: Invoice ====================
    /// Invoice not found
    InvoiceNotFound = 4001,
    /// Invoice already exists for this job
    InvoiceAlreadyExists = 4002,

    // ==================== 5xxx: Payment ====================
    /// Payment not found
    PaymentNotFound = 5001,
    /// Payment amount is not a positive finite number
    PaymentInvalidAmount = 5002,
    /// Payment amount exceeds the outstanding balance
    PaymentExceedsBalance = 5003,
    /// Payments cannot be recorded on a cancelled job
    PaymentOnCancelledJob = 5004,

    // ==================== 6xxx: Appointment ====================
    /// Appointment not found
    AppointmentNotFound = 6001,
    /// Technician already booked for an overlapping slot
    AppointmentConflict = 6002,
    /// Appointment is completed, cancelled or no-show
    AppointmentClosed = 6003,
    /// Appointment already converted into a job
    AppointmentAlreadyConverted = 6004,

    // ==================== 7xxx: CRM ====================
    /// Technician not found
    TechnicianNotFound = 7001,
    /// Technician is inactive
    TechnicianInactive = 7002,
    /// Price inquiry not found
    InquiryNotFound = 7101,
    /// Price inquiry already converted
    InquiryAlreadyConverted = 7102,
    /// Message template not found
    TemplateNotFound = 7201,
    /// Message template name already used
    TemplateNameExists = 7202,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Numeric value of this code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this code represents success
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",
            Self::BusinessRuleViolation => "Business rule violation",

            Self::CustomerNotFound => "Customer not found",
            Self::CustomerPhoneExists => "Phone number already registered",
            Self::CustomerHasJobs => "Customer has jobs",
            Self::VehicleNotFound => "Vehicle not found",
            Self::VehicleNotOwned => "Vehicle does not belong to customer",
            Self::VehicleHasJobs => "Vehicle has jobs",

            Self::JobNotFound => "Job not found",
            Self::JobStageLocked => "Job is closed",
            Self::JobStageUnchanged => "Job is already in this stage",
            Self::JobHasInvoice => "Job has an invoice",
            Self::JobNotCompleted => "Job is not completed",
            Self::JobTotalBelowPaid => "Job total is below amount paid",
            Self::ServiceItemInvalid => "Invalid service item",
            Self::MaterialNotFound => "Material record not found",

            Self::InventoryItemNotFound => "Inventory item not found",
            Self::InsufficientStock => "Insufficient stock",
            Self::InventoryItemInUse => "Inventory item is in use",
            Self::UnitMismatch => "Unit does not match item",
            Self::SkuExists => "SKU already exists",
            Self::RollNotFound => "Roll not found",
            Self::RollDepleted => "Roll is depleted",
            Self::RollInUse => "Roll is in use",

            Self::InvoiceNotFound => "Invoice not found",
            Self::InvoiceAlreadyExists => "Invoice already exists",

            Self::PaymentNotFound => "Payment not found",
            Self::PaymentInvalidAmount => "Invalid payment amount",
            Self::PaymentExceedsBalance => "Payment exceeds outstanding balance",
            Self::PaymentOnCancelledJob => "Job is cancelled",

            Self::AppointmentNotFound => "Appointment not found",
            Self::AppointmentConflict => "Technician already booked",
            Self::AppointmentClosed => "Appointment is closed",
            Self::AppointmentAlreadyConverted => "Appointment already converted",

            Self::TechnicianNotFound => "Technician not found",
            Self::TechnicianInactive => "Technician is inactive",
            Self::InquiryNotFound => "Inquiry not found",
            Self::InquiryAlreadyConverted => "Inquiry already converted",
            Self::TemplateNotFound => "Template not found",
            Self::TemplateNameExists => "Template name already exists",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            6 => Self::InvalidFormat,
            7 => Self::RequiredField,
            8 => Self::ValueOutOfRange,
            9 => Self::BusinessRuleViolation,

            1001 => Self::CustomerNotFound,
            1002 => Self::CustomerPhoneExists,
            1003 => Self::CustomerHasJobs,
            1101 => Self::VehicleNotFound,
            1102 => Self::VehicleNotOwned,
            1103 => Self::VehicleHasJobs,

            2001 => Self::JobNotFound,
            2002 => Self::JobStageLocked,
            2003 => Self::JobStageUnchanged,
            2004 => Self::JobHasInvoice,
            2005 => Self::JobNotCompleted,
            2006 => Self::JobTotalBelowPaid,
            2007 => Self::ServiceItemInvalid,
            2101 => Self::MaterialNotFound,

            3001 => Self::InventoryItemNotFound,
            3002 => Self::InsufficientStock,
            3003 => Self::InventoryItemInUse,
            3004 => Self::UnitMismatch,
            3005 => Self::SkuExists,
            3101 => Self::RollNotFound,
            3102 => Self::RollDepleted,
            3103 => Self::RollInUse,

            4001 => Self::InvoiceNotFound,
            4002 => Self::InvoiceAlreadyExists,

            5001 => Self::PaymentNotFound,
            5002 => Self::PaymentInvalidAmount,
            5003 => Self::PaymentExceedsBalance,
            5004 => Self::PaymentOnCancelledJob,

            6001 => Self::AppointmentNotFound,
            6002 => Self::AppointmentConflict,
            6003 => Self::AppointmentClosed,
            6004 => Self::AppointmentAlreadyConverted,

            7001 => Self::TechnicianNotFound,
            7002 => Self::TechnicianInactive,
            7101 => Self::InquiryNotFound,
            7102 => Self::InquiryAlreadyConverted,
            7201 => Self::TemplateNotFound,
            7202 => Self::TemplateNameExists,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::CustomerPhoneExists.code(), 1002);
        assert_eq!(ErrorCode::JobStageLocked.code(), 2002);
        assert_eq!(ErrorCode::InsufficientStock.code(), 3002);
        assert_eq!(ErrorCode::RollDepleted.code(), 3102);
        assert_eq!(ErrorCode::InvoiceAlreadyExists.code(), 4002);
        assert_eq!(ErrorCode::PaymentExceedsBalance.code(), 5003);
        assert_eq!(ErrorCode::AppointmentConflict.code(), 6002);
        assert_eq!(ErrorCode::TemplateNameExists.code(), 7202);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_covers_every_code() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::BusinessRuleViolation,
            ErrorCode::VehicleHasJobs,
            ErrorCode::MaterialNotFound,
            ErrorCode::RollInUse,
            ErrorCode::InvoiceNotFound,
            ErrorCode::PaymentOnCancelledJob,
            ErrorCode::AppointmentAlreadyConverted,
            ErrorCode::InquiryAlreadyConverted,
            ErrorCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(8001), Err(InvalidErrorCode(8001)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::JobNotFound).unwrap();
        assert_eq!(json, "2001");

        let code: ErrorCode = serde_json::from_str("3002").unwrap();
        assert_eq!(code, ErrorCode::InsufficientStock);

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(
            ErrorCode::PaymentExceedsBalance.message(),
            "Payment exceeds outstanding balance"
        );
    }
}
