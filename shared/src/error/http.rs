//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::CustomerNotFound
            | Self::VehicleNotFound
            | Self::JobNotFound
            | Self::MaterialNotFound
            | Self::InventoryItemNotFound
            | Self::RollNotFound
            | Self::InvoiceNotFound
            | Self::PaymentNotFound
            | Self::AppointmentNotFound
            | Self::TechnicianNotFound
            | Self::InquiryNotFound
            | Self::TemplateNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::CustomerPhoneExists
            | Self::CustomerHasJobs
            | Self::VehicleHasJobs
            | Self::JobStageLocked
            | Self::JobHasInvoice
            | Self::InventoryItemInUse
            | Self::SkuExists
            | Self::RollInUse
            | Self::InvoiceAlreadyExists
            | Self::PaymentOnCancelledJob
            | Self::AppointmentConflict
            | Self::AppointmentClosed
            | Self::AppointmentAlreadyConverted
            | Self::InquiryAlreadyConverted
            | Self::TemplateNameExists => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            Self::BusinessRuleViolation
            | Self::JobNotCompleted
            | Self::JobTotalBelowPaid
            | Self::InsufficientStock
            | Self::RollDepleted
            | Self::PaymentExceedsBalance
            | Self::TechnicianInactive => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::JobNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::RollNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::JobStageLocked.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::InvoiceAlreadyExists.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::AppointmentConflict.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_unprocessable_status() {
        assert_eq!(
            ErrorCode::InsufficientStock.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::PaymentExceedsBalance.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::PaymentInvalidAmount.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::JobStageUnchanged.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_error_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
