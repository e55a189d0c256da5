//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done using `Decimal` internally, then converted to
//! `f64` for storage/serialization.

use rust_decimal::prelude::*;

use super::CheckoutError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per unit
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i64 = 9999;

/// Convert an f64 monetary value to Decimal
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert a Decimal back to f64, rounded to 2 decimal places
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Line total: price × quantity
pub fn line_total(price: f64, quantity: i64) -> f64 {
    to_f64(to_decimal(price) * Decimal::from(quantity))
}

/// Sum of price × quantity over all lines
pub fn order_total(lines: impl IntoIterator<Item = (f64, i64)>) -> f64 {
    let total = lines
        .into_iter()
        .map(|(price, quantity)| to_decimal(price) * Decimal::from(quantity))
        .sum::<Decimal>();
    to_f64(total)
}

/// Split a total into (deposit, remaining).
///
/// The deposit is clamped so it can never exceed the total; the remainder
/// is total − deposit, never negative.
pub fn split_deposit(total: f64, requested_deposit: f64) -> (f64, f64) {
    let total = to_decimal(total);
    let deposit = to_decimal(requested_deposit).clamp(Decimal::ZERO, total);
    (to_f64(deposit), to_f64(total - deposit))
}

/// Validate that an amount is finite, non-negative and within bounds
pub fn validate_amount(value: f64, field: &str) -> Result<(), CheckoutError> {
    if !value.is_finite() {
        return Err(CheckoutError::Validation(format!(
            "{field} must be a finite number, got {value}"
        )));
    }
    if value < 0.0 {
        return Err(CheckoutError::Validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    if value > MAX_PRICE {
        return Err(CheckoutError::Validation(format!(
            "{field} exceeds maximum allowed ({MAX_PRICE}), got {value}"
        )));
    }
    Ok(())
}

/// Validate that a quantity is positive and within bounds
pub fn validate_quantity(quantity: i64) -> Result<(), CheckoutError> {
    if quantity <= 0 {
        return Err(CheckoutError::Validation(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(CheckoutError::Validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_avoids_float_drift() {
        // 3 × 0.1 would be 0.30000000000000004 in plain f64
        assert_eq!(line_total(0.1, 3), 0.3);
        assert_eq!(line_total(21.99, 2), 43.98);
        assert_eq!(line_total(139.99, 2), 279.98);
    }

    #[test]
    fn test_order_total_sums_lines() {
        let total = order_total([(21.99, 2), (5.0, 1), (0.1, 3)]);
        assert_eq!(total, 49.28);
        assert_eq!(order_total(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_deposit_split_basic() {
        let (deposit, remaining) = split_deposit(279.98, 10.0);
        assert_eq!(deposit, 10.0);
        assert_eq!(remaining, 269.98);
    }

    #[test]
    fn test_deposit_clamped_to_total() {
        // Deposit can never exceed the total
        let (deposit, remaining) = split_deposit(50.0, 80.0);
        assert_eq!(deposit, 50.0);
        assert_eq!(remaining, 0.0);

        let (deposit, remaining) = split_deposit(50.0, 50.0);
        assert_eq!(deposit, 50.0);
        assert_eq!(remaining, 0.0);
    }

    #[test]
    fn test_negative_deposit_clamped_to_zero() {
        let (deposit, remaining) = split_deposit(50.0, -5.0);
        assert_eq!(deposit, 0.0);
        assert_eq!(remaining, 50.0);
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0.0, "price").is_ok());
        assert!(validate_amount(99.99, "price").is_ok());
        assert!(validate_amount(-1.0, "price").is_err());
        assert!(validate_amount(f64::NAN, "price").is_err());
        assert!(validate_amount(f64::INFINITY, "price").is_err());
        assert!(validate_amount(2_000_000.0, "price").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(9999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
        assert!(validate_quantity(10_000).is_err());
    }
}
