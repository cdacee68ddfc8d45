//! Holiday surcharge calculation.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::config::HolidaySurcharge;
use crate::models::{AuditStep, LineItemKind, RuleOutcome};

use super::holidays::{find_holiday, HolidayMatch};
use super::surcharges::{describe_amount, priced_item};

/// Applies the holiday surcharge when the pickup date is a configured holiday.
pub fn calculate_holiday_surcharge(
    timestamp: NaiveDateTime,
    base_fare: Decimal,
    rule: &HolidaySurcharge,
    step_number: u32,
) -> RuleOutcome {
    let date = timestamp.date();
    let holiday = find_holiday(date, rule);
    let item = holiday.and_then(|_| priced_item(LineItemKind::Holiday, &rule.amount, base_fare));

    let reasoning = match (&holiday, &item) {
        (Some(found), Some(item)) => format!(
            "{} is a holiday ({}); {} = {}",
            date,
            describe_match(found),
            describe_amount(&rule.amount, base_fare),
            item.amount
        ),
        (Some(found), None) => format!(
            "{} is a holiday ({}) but the surcharge is zero",
            date,
            describe_match(found)
        ),
        (None, _) => format!("{} is not a holiday", date),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "holiday_surcharge".to_string(),
        rule_name: "Holiday Surcharge".to_string(),
        input: serde_json::json!({
            "date": date.to_string()
        }),
        output: serde_json::json!({
            "applies": item.is_some(),
            "holiday": holiday,
            "amount": item.as_ref().map(|i| i.amount.to_string())
        }),
        reasoning,
    };

    RuleOutcome { item, audit_step }
}

fn describe_match(found: &HolidayMatch) -> String {
    match found {
        HolidayMatch::Fixed { date } => format!("fixed date {}", String::from(*date)),
        HolidayMatch::Lustrum { date } => {
            format!("lustrum date {}", String::from(*date))
        }
        HolidayMatch::Movable { holiday } => format!("{:?}", holiday),
    }
}
