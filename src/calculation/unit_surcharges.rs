//! Per-unit surcharges: pets, luggage, extra passengers and waiting time.
//!
//! Each charges `billable units × fee`, where billable units are the count
//! above a free allowance. No item is produced when nothing is billable.

use rust_decimal::Decimal;

use crate::config::PerUnitFees;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, LineItem, LineItemKind, RuleOutcome};

use super::rounding::{measure_to_decimal, round_currency};

/// Charges `max(count - free_units, 0) × fee`.
///
/// # Errors
///
/// `InvalidInput` for a negative count, `CalculationError` on overflow.
///
/// # Examples
///
/// ```
/// use fare_engine::calculation::calculate_count_surcharge;
/// use fare_engine::models::LineItemKind;
/// use rust_decimal::Decimal;
///
/// let outcome = calculate_count_surcharge(LineItemKind::Pet, 2, 0, Decimal::new(350, 2), 1).unwrap();
/// assert_eq!(outcome.item.unwrap().amount, Decimal::new(700, 2));
/// ```
pub fn calculate_count_surcharge(
    kind: LineItemKind,
    count: i32,
    free_units: u32,
    fee: Decimal,
    step_number: u32,
) -> EngineResult<RuleOutcome> {
    if count < 0 {
        return Err(EngineError::invalid_input(
            &format!("{}_count", kind.id()),
            format!("{} is negative", count),
        ));
    }

    let billable = (i64::from(count) - i64::from(free_units)).max(0);
    let units = Decimal::from(billable);
    let item = priced_units(kind, units, fee)?;

    let reasoning = match &item {
        Some(item) if free_units > 0 => format!(
            "{} above the free {}: {} × {} = {}",
            count, free_units, units, fee, item.amount
        ),
        Some(item) => format!("{} × {} = {}", units, fee, item.amount),
        None if free_units > 0 => format!("{} within the free {}", count, free_units),
        None => format!("Count {}; nothing to charge", count),
    };

    Ok(RuleOutcome {
        audit_step: unit_audit_step(kind, step_number, count.into(), free_units, fee, &item, reasoning),
        item,
    })
}

/// Charges waiting time: `max(ceil(waiting_minutes) - free_minutes, 0) × rate`.
///
/// Started minutes are billed in full.
pub fn calculate_waiting_surcharge(
    waiting_minutes: f64,
    fees: &PerUnitFees,
    step_number: u32,
) -> EngineResult<RuleOutcome> {
    let minutes = measure_to_decimal("waiting_minutes", waiting_minutes)?.ceil();
    let free = Decimal::from(fees.free_waiting_minutes);
    let units = (minutes - free).max(Decimal::ZERO);
    let item = priced_units(LineItemKind::Waiting, units, fees.waiting_per_minute)?;

    let reasoning = match &item {
        Some(item) => format!(
            "{} min waited, first {} free: {} × {} = {}",
            minutes, free, units, fees.waiting_per_minute, item.amount
        ),
        None => format!("{} min waited, first {} free", minutes, free),
    };

    Ok(RuleOutcome {
        audit_step: unit_audit_step(
            LineItemKind::Waiting,
            step_number,
            serde_json::json!(minutes.to_string()),
            fees.free_waiting_minutes,
            fees.waiting_per_minute,
            &item,
            reasoning,
        ),
        item,
    })
}

fn priced_units(kind: LineItemKind, units: Decimal, fee: Decimal) -> EngineResult<Option<LineItem>> {
    if units.is_zero() {
        return Ok(None);
    }
    let raw = units
        .checked_mul(fee)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{} surcharge overflow: {} × {}", kind.id(), units, fee),
        })?;
    let amount = round_currency(raw);
    if amount.is_zero() {
        return Ok(None);
    }
    Ok(Some(LineItem::new(kind, units, fee, amount)))
}

fn unit_audit_step(
    kind: LineItemKind,
    step_number: u32,
    quantity: serde_json::Value,
    free_units: u32,
    fee: Decimal,
    item: &Option<LineItem>,
    reasoning: String,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: format!("{}_surcharge", kind.id()),
        rule_name: kind.description().to_string(),
        input: serde_json::json!({
            "quantity": quantity,
            "free_units": free_units,
            "fee": fee.to_string()
        }),
        output: serde_json::json!({
            "applies": item.is_some(),
            "billable_units": item.as_ref().map(|i| i.units.to_string()),
            "amount": item.as_ref().map(|i| i.amount.to_string())
        }),
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn fees() -> PerUnitFees {
        PerUnitFees {
            pet: dec("3.50"),
            large_luggage: dec("1.50"),
            small_luggage: dec("0.50"),
            extra_passenger: dec("1.00"),
            waiting_per_minute: dec("0.50"),
            free_passengers: 4,
            free_waiting_minutes: 3,
        }
    }

    #[test]
    fn test_two_pets() {
        let outcome = calculate_count_surcharge(LineItemKind::Pet, 2, 0, dec("3.50"), 1).unwrap();
        let item = outcome.item.unwrap();
        assert_eq!(item.kind, LineItemKind::Pet);
        assert_eq!(item.units, dec("2"));
        assert_eq!(item.amount, dec("7.00"));
        assert_eq!(outcome.audit_step.rule_id, "pet_surcharge");
    }

    #[test]
    fn test_zero_count_produces_no_item() {
        let outcome =
            calculate_count_surcharge(LineItemKind::LargeLuggage, 0, 0, dec("1.50"), 1).unwrap();
        assert!(outcome.item.is_none());
        assert!(!outcome.audit_step.output["applies"].as_bool().unwrap());
    }

    #[test]
    fn test_negative_count_is_invalid_input() {
        match calculate_count_surcharge(LineItemKind::Pet, -1, 0, dec("3.50"), 1) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "pet_count"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_passengers_within_allowance_are_free() {
        let outcome =
            calculate_count_surcharge(LineItemKind::ExtraPassenger, 4, 4, dec("1.00"), 1).unwrap();
        assert!(outcome.item.is_none());
        assert!(outcome.audit_step.reasoning.contains("within the free 4"));
    }

    #[test]
    fn test_passengers_above_allowance_are_charged() {
        let outcome =
            calculate_count_surcharge(LineItemKind::ExtraPassenger, 6, 4, dec("1.00"), 1).unwrap();
        let item = outcome.item.unwrap();
        assert_eq!(item.units, dec("2"));
        assert_eq!(item.amount, dec("2.00"));
    }

    #[test]
    fn test_zero_fee_produces_no_item() {
        let outcome =
            calculate_count_surcharge(LineItemKind::SmallLuggage, 3, 0, Decimal::ZERO, 1).unwrap();
        assert!(outcome.item.is_none());
    }

    #[test]
    fn test_waiting_rounds_started_minutes_up() {
        // ceil(5.2) = 6, minus 3 free = 3 × 0.50
        let outcome = calculate_waiting_surcharge(5.2, &fees(), 1).unwrap();
        let item = outcome.item.unwrap();
        assert_eq!(item.kind, LineItemKind::Waiting);
        assert_eq!(item.units, dec("3"));
        assert_eq!(item.amount, dec("1.50"));
    }

    #[test]
    fn test_waiting_within_free_minutes() {
        let outcome = calculate_waiting_surcharge(3.0, &fees(), 1).unwrap();
        assert!(outcome.item.is_none());
        let outcome = calculate_waiting_surcharge(0.0, &fees(), 1).unwrap();
        assert!(outcome.item.is_none());
    }

    #[test]
    fn test_waiting_rejects_negative_minutes() {
        assert!(matches!(
            calculate_waiting_surcharge(-1.0, &fees(), 1),
            Err(EngineError::InvalidInput { .. })
        ));
    }
}
