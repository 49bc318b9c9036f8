//! Money helpers
//!
//! Prices and order amounts are carried as `Decimal` in major units. The
//! payment gateway API speaks minor units (paise/cents), so conversion
//! happens exactly once, at the gateway boundary.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::TypesError;

/// Currency code used for all marketplace trades.
pub const CURRENCY: &str = "INR";

/// Convert a major-unit amount into gateway minor units (x100).
///
/// Fails on negative amounts, fractional minor units, or amounts that do
/// not fit an `i64`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, TypesError> {
    if amount <= Decimal::ZERO {
        return Err(TypesError::NonPositiveAmount(amount));
    }
    let minor = amount * Decimal::from(100);
    if minor.fract() != Decimal::ZERO {
        return Err(TypesError::SubMinorPrecision(amount));
    }
    minor
        .to_i64()
        .ok_or(TypesError::AmountOverflow(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_whole_amount() {
        assert_eq!(to_minor_units(dec!(500)).unwrap(), 50_000);
    }

    #[test]
    fn test_fractional_amount() {
        assert_eq!(to_minor_units(dec!(19.99)).unwrap(), 1_999);
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert!(to_minor_units(Decimal::ZERO).is_err());
        assert!(to_minor_units(dec!(-1)).is_err());
    }

    #[test]
    fn test_rejects_sub_minor_precision() {
        assert!(to_minor_units(dec!(0.001)).is_err());
    }
}
