//! Base fare calculation functionality.
//!
//! The base fare is derived purely from distance and duration: a start fare
//! plus a per-kilometre and a per-minute component, clamped to the tariff's
//! minimum and maximum fare.

use rust_decimal::Decimal;

use crate::config::RateTable;
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

use super::rounding::{measure_to_decimal, round_currency};

/// Which bound, if any, the base fare was clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FareClamp {
    /// The raw fare was inside the bounds.
    None,
    /// The raw fare was raised to the minimum fare.
    Minimum,
    /// The raw fare was lowered to the maximum fare.
    Maximum,
}

/// The result of a base fare calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct BaseFareResult {
    /// The clamped base fare, rounded to cents.
    pub base_fare: Decimal,
    /// The fare before clamping.
    pub raw_fare: Decimal,
    /// Which bound was applied.
    pub clamp: FareClamp,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the base fare for a trip.
///
/// `start_fare + distance_km × per_km + duration_minutes × per_minute`,
/// clamped to `[min_fare, max_fare]`.
///
/// # Errors
///
/// `InvalidInput` if either argument is negative, NaN or infinite.
///
/// # Examples
///
/// ```no_run
/// use fare_engine::calculation::compute_base_fare;
/// use fare_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let loader = ConfigLoader::load("config/standard").unwrap();
/// let fare = compute_base_fare(10.0, 20.0, loader.rates()).unwrap();
/// // 8.50 + 10 × 2.50 + 20 × 0.45
/// assert_eq!(fare, Decimal::from_str("42.50").unwrap());
/// ```
pub fn compute_base_fare(
    distance_km: f64,
    duration_minutes: f64,
    rates: &RateTable,
) -> EngineResult<Decimal> {
    calculate_base_fare(distance_km, duration_minutes, rates, 1).map(|r| r.base_fare)
}

/// Computes the base fare and records an audit step for it.
pub fn calculate_base_fare(
    distance_km: f64,
    duration_minutes: f64,
    rates: &RateTable,
    step_number: u32,
) -> EngineResult<BaseFareResult> {
    let distance = measure_to_decimal("distance_km", distance_km)?;
    let duration = measure_to_decimal("duration_minutes", duration_minutes)?;
    let base = &rates.base;

    let raw_fare = distance
        .checked_mul(base.per_km)
        .and_then(|d| duration.checked_mul(base.per_minute).map(|t| (d, t)))
        .and_then(|(d, t)| d.checked_add(t))
        .and_then(|sum| sum.checked_add(base.start_fare))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!(
                "base fare overflow for {} km / {} min",
                distance_km, duration_minutes
            ),
        })?;

    let (clamped, clamp) = if raw_fare < base.min_fare {
        (base.min_fare, FareClamp::Minimum)
    } else if raw_fare > base.max_fare {
        (base.max_fare, FareClamp::Maximum)
    } else {
        (raw_fare, FareClamp::None)
    };
    let base_fare = round_currency(clamped);

    let reasoning = match clamp {
        FareClamp::None => format!(
            "{} + {} km × {} + {} min × {} = {}",
            base.start_fare, distance, base.per_km, duration, base.per_minute, base_fare
        ),
        FareClamp::Minimum => format!(
            "Raw fare {} is below the minimum fare; charged {}",
            round_currency(raw_fare),
            base_fare
        ),
        FareClamp::Maximum => format!(
            "Raw fare {} is above the maximum fare; charged {}",
            round_currency(raw_fare),
            base_fare
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "base_fare".to_string(),
        rule_name: "Base Fare".to_string(),
        input: serde_json::json!({
            "distance_km": distance.normalize().to_string(),
            "duration_minutes": duration.normalize().to_string(),
            "start_fare": base.start_fare.to_string(),
            "per_km": base.per_km.to_string(),
            "per_minute": base.per_minute.to_string()
        }),
        output: serde_json::json!({
            "raw_fare": raw_fare.normalize().to_string(),
            "clamped_to": match clamp {
                FareClamp::None => serde_json::Value::Null,
                FareClamp::Minimum => "min_fare".into(),
                FareClamp::Maximum => "max_fare".into(),
            },
            "base_fare": base_fare.to_string()
        }),
        reasoning,
    };

    Ok(BaseFareResult {
        base_fare,
        raw_fare,
        clamp,
        audit_step,
    })
}
