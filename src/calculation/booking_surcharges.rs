//! Booking surcharges: advance reservation and payment method.
//!
//! Both are flat fees charged at most once per trip. A zero fee never
//! produces an item.

use rust_decimal::Decimal;

use crate::config::{PaymentMethodFees, ReservationSurcharge};
use crate::models::{AuditStep, LineItem, LineItemKind, PaymentMethod, RuleOutcome};

use super::rounding::round_currency;

/// Charges the reservation fee when the trip is booked in advance.
pub fn calculate_reservation_surcharge(
    is_reservation: bool,
    rule: &ReservationSurcharge,
    step_number: u32,
) -> RuleOutcome {
    let item = if is_reservation {
        flat_item(LineItemKind::Reservation, rule.fee)
    } else {
        None
    };

    let reasoning = match (&item, is_reservation) {
        (Some(item), _) => format!("Booked in advance; fee {}", item.amount),
        (None, true) => "Booked in advance; no fee configured".to_string(),
        (None, false) => "Not a reservation".to_string(),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "reservation_surcharge".to_string(),
        rule_name: "Reservation Surcharge".to_string(),
        input: serde_json::json!({
            "is_reservation": is_reservation,
            "fee": rule.fee.to_string()
        }),
        output: serde_json::json!({
            "applies": item.is_some(),
            "amount": item.as_ref().map(|i| i.amount.to_string())
        }),
        reasoning,
    };

    RuleOutcome { item, audit_step }
}

/// Charges the fee configured for the rider's payment method.
///
/// # Examples
///
/// ```
/// use fare_engine::calculation::calculate_payment_method_surcharge;
/// use fare_engine::config::PaymentMethodFees;
/// use fare_engine::models::PaymentMethod;
/// use rust_decimal::Decimal;
///
/// let fees = PaymentMethodFees { credit_card: Decimal::new(150, 2), ..Default::default() };
///
/// let outcome = calculate_payment_method_surcharge(PaymentMethod::CreditCard, &fees, 1);
/// assert_eq!(outcome.item.unwrap().amount, Decimal::new(150, 2));
///
/// let outcome = calculate_payment_method_surcharge(PaymentMethod::Pin, &fees, 1);
/// assert!(outcome.item.is_none());
/// ```
pub fn calculate_payment_method_surcharge(
    method: PaymentMethod,
    fees: &PaymentMethodFees,
    step_number: u32,
) -> RuleOutcome {
    let fee = fees.fee(method);
    let item = flat_item(LineItemKind::PaymentMethod, fee).map(|mut item| {
        item.description = format!("{} ({})", item.description, method.id());
        item
    });

    let reasoning = match &item {
        Some(item) => format!("Paying by {}; fee {}", method.id(), item.amount),
        None => format!("Paying by {} is free", method.id()),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "payment_method_surcharge".to_string(),
        rule_name: "Payment Method Surcharge".to_string(),
        input: serde_json::json!({
            "payment_method": method,
            "fee": fee.to_string()
        }),
        output: serde_json::json!({
            "applies": item.is_some(),
            "amount": item.as_ref().map(|i| i.amount.to_string())
        }),
        reasoning,
    };

    RuleOutcome { item, audit_step }
}

fn flat_item(kind: LineItemKind, fee: Decimal) -> Option<LineItem> {
    let amount = round_currency(fee);
    if amount <= Decimal::ZERO {
        return None;
    }
    Some(LineItem::new(kind, Decimal::ONE, fee, amount))
}
