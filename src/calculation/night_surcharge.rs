//! Night surcharge calculation.

use chrono::{NaiveDateTime, Timelike};
use rust_decimal::Decimal;

use crate::config::NightSurcharge;
use crate::models::{AuditStep, LineItemKind, RuleOutcome};

use super::surcharges::{describe_amount, priced_item};
use super::time_windows::is_hour_in_window;

/// Applies the night surcharge when the pickup hour falls in the night window.
///
/// # Examples
///
/// ```
/// use fare_engine::calculation::calculate_night_surcharge;
/// use fare_engine::config::{NightSurcharge, SurchargeAmount};
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let rule = NightSurcharge {
///     start_hour: 23,
///     end_hour: 6,
///     amount: SurchargeAmount::Flat { amount: Decimal::new(250, 2) },
/// };
/// let at = NaiveDateTime::parse_from_str("2026-01-14 23:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
///
/// let outcome = calculate_night_surcharge(at, Decimal::new(4250, 2), &rule, 1);
/// assert_eq!(outcome.item.unwrap().amount, Decimal::new(250, 2));
/// ```
pub fn calculate_night_surcharge(
    timestamp: NaiveDateTime,
    base_fare: Decimal,
    rule: &NightSurcharge,
    step_number: u32,
) -> RuleOutcome {
    let hour = timestamp.hour();
    let in_window = is_hour_in_window(hour, rule.start_hour, rule.end_hour);
    let item = if in_window {
        priced_item(LineItemKind::Night, &rule.amount, base_fare)
    } else {
        None
    };

    let reasoning = match &item {
        Some(item) => format!(
            "Pickup hour {} is within {:02}:00-{:02}:00; {} = {}",
            hour,
            rule.start_hour,
            rule.end_hour,
            describe_amount(&rule.amount, base_fare),
            item.amount
        ),
        None if in_window => format!(
            "Pickup hour {} is within the night window but the surcharge is zero",
            hour
        ),
        None => format!(
            "Pickup hour {} is outside {:02}:00-{:02}:00",
            hour, rule.start_hour, rule.end_hour
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "night_surcharge".to_string(),
        rule_name: "Night Surcharge".to_string(),
        input: serde_json::json!({
            "timestamp": timestamp.to_string(),
            "hour": hour,
            "start_hour": rule.start_hour,
            "end_hour": rule.end_hour
        }),
        output: serde_json::json!({
            "applies": item.is_some(),
            "amount": item.as_ref().map(|i| i.amount.to_string())
        }),
        reasoning,
    };

    RuleOutcome { item, audit_step }
}
