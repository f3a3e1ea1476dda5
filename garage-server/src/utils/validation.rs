//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: customer, technician, inventory item, template, service
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, inquiry messages
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, plate number, VIN, SKU, roll code
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// WhatsApp template bodies
pub const MAX_TEMPLATE_LEN: usize = 4096;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate that an optional number is finite and not negative.
pub fn validate_non_negative(value: Option<f64>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value
        && (!v.is_finite() || v < 0.0)
    {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative number, got {v}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Asha", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn text_length_is_enforced() {
        let long = "x".repeat(MAX_SHORT_TEXT_LEN + 1);
        assert!(validate_required_text(&long, "phone", MAX_SHORT_TEXT_LEN).is_err());
        assert!(validate_optional_text(&Some(long), "vin", MAX_SHORT_TEXT_LEN).is_err());
        assert!(validate_optional_text(&None, "vin", MAX_SHORT_TEXT_LEN).is_ok());
    }

    #[test]
    fn non_negative_rejects_nan_and_negatives() {
        assert!(validate_non_negative(Some(f64::NAN), "discount").is_err());
        assert!(validate_non_negative(Some(-1.0), "discount").is_err());
        assert!(validate_non_negative(Some(0.0), "discount").is_ok());
        assert!(validate_non_negative(None, "discount").is_ok());
    }
}
