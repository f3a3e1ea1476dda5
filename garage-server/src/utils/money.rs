//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;
use shared::models::{PaymentStatus, ServiceItemInput};

use crate::utils::AppError;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price per service line (₹10,000,000)
const MAX_PRICE: f64 = 10_000_000.0;
/// Maximum allowed quantity per service line
const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed tax rate in percent
const MAX_TAX_RATE: f64 = 100.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field_name} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

/// Validate a service line before it is priced
pub fn validate_service_item(item: &ServiceItemInput) -> Result<(), AppError> {
    require_finite(item.price, "price")?;
    if item.price < 0.0 || item.price > MAX_PRICE {
        return Err(AppError::with_message(
            shared::error::ErrorCode::ServiceItemInvalid,
            format!("price must be between 0 and {MAX_PRICE}, got {}", item.price),
        ));
    }
    if item.quantity <= 0 || item.quantity > MAX_QUANTITY {
        return Err(AppError::with_message(
            shared::error::ErrorCode::ServiceItemInvalid,
            format!(
                "quantity must be between 1 and {MAX_QUANTITY}, got {}",
                item.quantity
            ),
        ));
    }
    Ok(())
}

/// Validate a payment amount (finite and positive)
pub fn validate_payment_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::with_message(
            shared::error::ErrorCode::PaymentInvalidAmount,
            format!("payment amount must be a positive number, got {amount}"),
        ));
    }
    Ok(())
}

/// Computed monetary fields of a job
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total: f64,
}

/// Price a job from its service lines
///
/// - subtotal: Σ price × quantity
/// - discount: must lie within [0, subtotal]
/// - tax_amount: (subtotal - discount) × tax_rate / 100
/// - total: subtotal - discount + tax_amount
pub fn calculate_totals(
    items: &[ServiceItemInput],
    discount: f64,
    tax_rate: f64,
) -> Result<JobTotals, AppError> {
    require_finite(discount, "discount")?;
    require_finite(tax_rate, "tax_rate")?;
    if !(0.0..=MAX_TAX_RATE).contains(&tax_rate) {
        return Err(AppError::validation(format!(
            "tax_rate must be between 0 and {MAX_TAX_RATE}, got {tax_rate}"
        )));
    }

    let mut subtotal = Decimal::ZERO;
    for item in items {
        validate_service_item(item)?;
        subtotal += to_decimal(item.price) * Decimal::from(item.quantity);
    }

    let discount_dec = to_decimal(discount);
    if discount_dec < Decimal::ZERO || discount_dec > subtotal {
        return Err(AppError::validation(format!(
            "discount must be between 0 and the subtotal ({}), got {discount}",
            to_f64(subtotal)
        )));
    }

    let taxable = subtotal - discount_dec;
    let tax_amount = (taxable * to_decimal(tax_rate) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let total = taxable + tax_amount;

    Ok(JobTotals {
        subtotal: to_f64(subtotal),
        discount: to_f64(discount_dec),
        tax_rate,
        tax_amount: to_f64(tax_amount),
        total: to_f64(total),
    })
}

/// Outstanding balance, never negative
pub fn balance(total: f64, paid: f64) -> f64 {
    to_f64((to_decimal(total) - to_decimal(paid)).max(Decimal::ZERO))
}

/// Settlement state for a total and the amount paid against it
pub fn payment_status(total: f64, paid: f64) -> PaymentStatus {
    let paid = to_decimal(paid);
    if paid <= Decimal::ZERO {
        PaymentStatus::Unpaid
    } else if to_decimal(total) - paid <= MONEY_TOLERANCE {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Partial
    }
}

/// Whether `amount` fits within the outstanding `balance` (with tolerance)
pub fn fits_balance(amount: f64, balance: f64) -> bool {
    to_decimal(amount) <= to_decimal(balance) + MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: f64, quantity: i32) -> ServiceItemInput {
        ServiceItemInput {
            name: "Ceramic coating".into(),
            description: None,
            price,
            quantity,
        }
    }

    #[test]
    fn test_to_decimal_precision() {
        let a = 0.1_f64;
        let b = 0.2_f64;
        assert_ne!(a + b, 0.3);
        assert_eq!(to_f64(to_decimal(a) + to_decimal(b)), 0.3);
    }

    #[test]
    fn totals_apply_discount_before_tax() {
        let totals = calculate_totals(&[line(1000.0, 2), line(499.99, 1)], 100.0, 18.0).unwrap();
        assert_eq!(totals.subtotal, 2499.99);
        assert_eq!(totals.discount, 100.0);
        // (2499.99 - 100) * 0.18 = 431.9982
        assert_eq!(totals.tax_amount, 432.0);
        assert_eq!(totals.total, 2831.99);
    }

    #[test]
    fn totals_without_items_are_zero() {
        let totals = calculate_totals(&[], 0.0, 18.0).unwrap();
        assert_eq!(totals.total, 0.0);
        assert_eq!(totals.tax_amount, 0.0);
    }

    #[test]
    fn discount_above_subtotal_is_rejected() {
        assert!(calculate_totals(&[line(100.0, 1)], 100.01, 0.0).is_err());
        assert!(calculate_totals(&[line(100.0, 1)], -1.0, 0.0).is_err());
        assert!(calculate_totals(&[line(100.0, 1)], 100.0, 0.0).is_ok());
    }

    #[test]
    fn invalid_lines_are_rejected() {
        let err = calculate_totals(&[line(-5.0, 1)], 0.0, 0.0).unwrap_err();
        assert_eq!(err.code, shared::error::ErrorCode::ServiceItemInvalid);
        assert!(calculate_totals(&[line(5.0, 0)], 0.0, 0.0).is_err());
        assert!(calculate_totals(&[line(f64::NAN, 1)], 0.0, 0.0).is_err());
        assert!(calculate_totals(&[line(5.0, 1)], 0.0, 150.0).is_err());
    }

    #[test]
    fn payment_status_follows_paid_amount() {
        assert_eq!(payment_status(500.0, 0.0), PaymentStatus::Unpaid);
        assert_eq!(payment_status(500.0, 200.0), PaymentStatus::Partial);
        assert_eq!(payment_status(500.0, 499.995), PaymentStatus::Paid);
        assert_eq!(payment_status(500.0, 500.0), PaymentStatus::Paid);
    }

    #[test]
    fn balance_is_clamped_at_zero() {
        assert_eq!(balance(500.0, 200.0), 300.0);
        assert_eq!(balance(500.0, 500.004), 0.0);
    }

    #[test]
    fn payments_may_exceed_balance_only_within_tolerance() {
        assert!(fits_balance(300.0, 300.0));
        assert!(fits_balance(300.01, 300.0));
        assert!(!fits_balance(300.02, 300.0));
    }

    #[test]
    fn payment_amount_must_be_positive() {
        assert!(validate_payment_amount(0.0).is_err());
        assert!(validate_payment_amount(-10.0).is_err());
        assert!(validate_payment_amount(f64::INFINITY).is_err());
        assert!(validate_payment_amount(0.01).is_ok());
    }
}
