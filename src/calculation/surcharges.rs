//! Surcharge evaluation.
//!
//! Runs every surcharge rule against a trip. Rules are independent: any
//! combination may fire, and each contributes at most one line item whose
//! amount is rounded to cents before the items are summed.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{RateTable, SurchargeAmount};
use crate::error::EngineResult;
use crate::models::{AdjustmentSummary, AuditStep, LineItem, LineItemKind, RuleOutcome, TripRequest};

use super::airport_surcharge::calculate_airport_surcharge;
use super::booking_surcharges::{calculate_payment_method_surcharge, calculate_reservation_surcharge};
use super::holiday_surcharge::calculate_holiday_surcharge;
use super::night_surcharge::calculate_night_surcharge;
use super::rounding::round_currency;
use super::unit_surcharges::{calculate_count_surcharge, calculate_waiting_surcharge};
use super::weekend_surcharge::calculate_weekend_surcharge;

/// The fired surcharges and the audit steps of every rule evaluated.
#[derive(Debug, Clone)]
pub struct SurchargeEvaluation {
    /// Fired surcharge items and their total.
    pub surcharges: AdjustmentSummary,
    /// One step per rule, numbered from 1.
    pub audit_steps: Vec<AuditStep>,
}

/// Evaluates every surcharge rule for a trip.
///
/// Rules run in a fixed order: night, weekend, holiday, airport, pets, large
/// luggage, small luggage, extra passengers, waiting, reservation, payment
/// method.
///
/// # Errors
///
/// `InvalidInput` when the trip fails validation.
pub fn evaluate_surcharges(
    trip: &TripRequest,
    base_fare: Decimal,
    rates: &RateTable,
) -> EngineResult<SurchargeEvaluation> {
    trip.validate()?;

    let fees = &rates.per_unit_fees;
    let mut outcomes = Vec::with_capacity(11);
    outcomes.push(calculate_night_surcharge(trip.timestamp, base_fare, &rates.night, 1));
    outcomes.push(calculate_weekend_surcharge(trip.timestamp, base_fare, &rates.weekend, 2));
    outcomes.push(calculate_holiday_surcharge(trip.timestamp, base_fare, &rates.holiday, 3));
    outcomes.push(calculate_airport_surcharge(
        &trip.pickup_label,
        &trip.dropoff_label,
        &rates.airport,
        4,
    ));
    outcomes.push(calculate_count_surcharge(LineItemKind::Pet, trip.pet_count, 0, fees.pet, 5)?);
    outcomes.push(calculate_count_surcharge(
        LineItemKind::LargeLuggage,
        trip.large_luggage_count,
        0,
        fees.large_luggage,
        6,
    )?);
    outcomes.push(calculate_count_surcharge(
        LineItemKind::SmallLuggage,
        trip.small_luggage_count,
        0,
        fees.small_luggage,
        7,
    )?);
    outcomes.push(calculate_count_surcharge(
        LineItemKind::ExtraPassenger,
        trip.passenger_count,
        fees.free_passengers,
        fees.extra_passenger,
        8,
    )?);
    outcomes.push(calculate_waiting_surcharge(trip.waiting_minutes, fees, 9)?);
    outcomes.push(calculate_reservation_surcharge(trip.is_reservation, &rates.reservation, 10));
    outcomes.push(calculate_payment_method_surcharge(
        trip.payment_method,
        &rates.payment_method,
        11,
    ));

    let mut items = Vec::new();
    let mut audit_steps = Vec::with_capacity(outcomes.len());
    for RuleOutcome { item, audit_step } in outcomes {
        if let Some(item) = item {
            debug!(kind = item.kind.id(), amount = %item.amount, "Surcharge applied");
            items.push(item);
        }
        audit_steps.push(audit_step);
    }

    Ok(SurchargeEvaluation {
        surcharges: AdjustmentSummary::from_items(items),
        audit_steps,
    })
}

/// Prices a time-based surcharge; `None` when it rounds to zero.
///
/// The item carries one unit at the unrounded amount.
pub(super) fn priced_item(
    kind: LineItemKind,
    amount: &SurchargeAmount,
    base_fare: Decimal,
) -> Option<LineItem> {
    let raw = amount.apply(base_fare);
    let rounded = round_currency(raw);
    if rounded.is_zero() {
        return None;
    }
    Some(LineItem::new(kind, Decimal::ONE, raw, rounded))
}

pub(super) fn describe_amount(amount: &SurchargeAmount, base_fare: Decimal) -> String {
    match amount {
        SurchargeAmount::Flat { amount } => format!("flat {}", amount),
        SurchargeAmount::Multiplier { multiplier } => {
            format!("{} × ({} - 1)", base_fare, multiplier)
        }
    }
}
