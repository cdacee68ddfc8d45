//! Weekend surcharge calculation.

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;

use crate::config::WeekendSurcharge;
use crate::models::{AuditStep, LineItemKind, RuleOutcome};

use super::surcharges::{describe_amount, priced_item};
use super::time_windows::is_in_weekly_window;

/// Applies the weekend surcharge when the pickup falls in the weekly window
/// (by default Friday 18:00 through Monday 06:00).
pub fn calculate_weekend_surcharge(
    timestamp: NaiveDateTime,
    base_fare: Decimal,
    rule: &WeekendSurcharge,
    step_number: u32,
) -> RuleOutcome {
    let in_window = is_in_weekly_window(
        timestamp,
        rule.start_day,
        rule.start_hour,
        rule.end_day,
        rule.end_hour,
    );
    let item = if in_window {
        priced_item(LineItemKind::Weekend, &rule.amount, base_fare)
    } else {
        None
    };

    let window = format!(
        "{} {:02}:00 - {} {:02}:00",
        rule.start_day, rule.start_hour, rule.end_day, rule.end_hour
    );
    let reasoning = match &item {
        Some(item) => format!(
            "{} {} is within {}; {} = {}",
            timestamp.weekday(),
            timestamp.time(),
            window,
            describe_amount(&rule.amount, base_fare),
            item.amount
        ),
        None => format!(
            "{} {} is outside {}",
            timestamp.weekday(),
            timestamp.time(),
            window
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "weekend_surcharge".to_string(),
        rule_name: "Weekend Surcharge".to_string(),
        input: serde_json::json!({
            "timestamp": timestamp.to_string(),
            "weekday": timestamp.weekday().to_string(),
            "window": window
        }),
        output: serde_json::json!({
            "applies": item.is_some(),
            "amount": item.as_ref().map(|i| i.amount.to_string())
        }),
        reasoning,
    };

    RuleOutcome { item, audit_step }
}
