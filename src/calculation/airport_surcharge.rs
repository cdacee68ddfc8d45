//! Airport surcharge calculation.
//!
//! A trip to or from an airport pays a single flat fee. A trip between two
//! airports pays it once.

use rust_decimal::Decimal;

use crate::config::AirportSurcharge;
use crate::models::{AuditStep, LineItem, LineItemKind, RuleOutcome};

use super::rounding::round_currency;

/// Returns the first configured location contained in `label`, ignoring case.
pub fn match_airport<'a>(label: &str, rule: &'a AirportSurcharge) -> Option<&'a str> {
    let label = label.to_lowercase();
    if label.trim().is_empty() {
        return None;
    }
    rule.locations
        .iter()
        .find(|location| {
            let location = location.trim().to_lowercase();
            !location.is_empty() && label.contains(&location)
        })
        .map(String::as_str)
}

/// Applies the airport fee when the pickup or dropoff is an airport.
pub fn calculate_airport_surcharge(
    pickup_label: &str,
    dropoff_label: &str,
    rule: &AirportSurcharge,
    step_number: u32,
) -> RuleOutcome {
    let pickup = match_airport(pickup_label, rule);
    let dropoff = match_airport(dropoff_label, rule);
    let fee = round_currency(rule.fee);

    let item = if (pickup.is_some() || dropoff.is_some()) && !fee.is_zero() {
        Some(LineItem::new(LineItemKind::Airport, Decimal::ONE, rule.fee, fee))
    } else {
        None
    };

    let reasoning = match (pickup, dropoff) {
        (Some(p), Some(d)) => format!(
            "Pickup matches {} and dropoff matches {}; fee {} charged once",
            p, d, fee
        ),
        (Some(p), None) => format!("Pickup matches {}; fee {}", p, fee),
        (None, Some(d)) => format!("Dropoff matches {}; fee {}", d, fee),
        (None, None) => "Neither pickup nor dropoff is an airport".to_string(),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "airport_surcharge".to_string(),
        rule_name: "Airport Surcharge".to_string(),
        input: serde_json::json!({
            "pickup_label": pickup_label,
            "dropoff_label": dropoff_label
        }),
        output: serde_json::json!({
            "applies": item.is_some(),
            "pickup_airport": pickup,
            "dropoff_airport": dropoff,
            "amount": item.as_ref().map(|i| i.amount.to_string())
        }),
        reasoning,
    };

    RuleOutcome { item, audit_step }
}
