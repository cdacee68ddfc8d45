//! Currency rounding and float conversion.

use rust_decimal::prelude::*;

use crate::error::{EngineError, EngineResult};
use crate::models::validate_measure;

/// Monetary amounts are kept to cents.
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

/// Rounds an amount to cents, half away from zero.
///
/// Banker's rounding is not used: 0.125 becomes 0.13, not 0.12.
///
/// # Examples
///
/// ```
/// use fare_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from_str("0.125").unwrap()), Decimal::from_str("0.13").unwrap());
/// assert_eq!(round_currency(Decimal::from_str("2.345").unwrap()), Decimal::from_str("2.35").unwrap());
/// assert_eq!(round_currency(Decimal::from_str("-0.125").unwrap()), Decimal::from_str("-0.13").unwrap());
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        CURRENCY_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Converts a validated trip measurement to a Decimal.
///
/// Fails with `InvalidInput` for NaN, infinities, negative values and
/// values outside the Decimal range.
pub(crate) fn measure_to_decimal(field: &str, value: f64) -> EngineResult<Decimal> {
    validate_measure(field, value)?;
    Decimal::from_f64(value)
        .ok_or_else(|| EngineError::invalid_input(field, format!("{} is out of range", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_currency(dec("0.005")), dec("0.01"));
        assert_eq!(round_currency(dec("0.015")), dec("0.02"));
        assert_eq!(round_currency(dec("0.025")), dec("0.03"));
        assert_eq!(round_currency(dec("1.004")), dec("1.00"));
    }

    #[test]
    fn test_round_is_not_bankers() {
        // MidpointNearestEven would give 2.52 here.
        assert_eq!(round_currency(dec("2.525")), dec("2.53"));
    }

    #[test]
    fn test_round_keeps_exact_cents() {
        assert_eq!(round_currency(dec("42.50")), dec("42.50"));
        assert_eq!(round_currency(dec("7")), dec("7"));
    }

    #[test]
    fn test_measure_to_decimal_accepts_plain_values() {
        assert_eq!(measure_to_decimal("distance_km", 10.0).unwrap(), dec("10"));
        assert_eq!(measure_to_decimal("distance_km", 0.0).unwrap(), Decimal::ZERO);
        assert_eq!(measure_to_decimal("distance_km", 12.5).unwrap(), dec("12.5"));
    }

    #[test]
    fn test_measure_to_decimal_rejects_invalid_values() {
        assert!(measure_to_decimal("distance_km", -0.5).is_err());
        assert!(measure_to_decimal("distance_km", f64::NAN).is_err());
        assert!(measure_to_decimal("distance_km", f64::NEG_INFINITY).is_err());
        assert!(measure_to_decimal("distance_km", 1e40).is_err());
    }
}
