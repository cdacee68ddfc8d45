//! Full fare calculation.
//!
//! Runs the pipeline validate → base fare → surcharges → discounts →
//! subtotal → VAT → totals, collecting one audit trace across all stages.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::RateTable;
use crate::error::EngineResult;
use crate::models::{AuditStep, PriceBreakdown, TripRequest};

use super::base_fare::calculate_base_fare;
use super::discounts::evaluate_discounts;
use super::rounding::round_currency;
use super::surcharges::evaluate_surcharges;

/// Calculates the complete price breakdown for a trip.
///
/// The result depends only on `trip` and `rates`; the clock is never read,
/// so the same inputs always give the same breakdown.
///
/// # Errors
///
/// - `InvalidInput` when a trip field is negative or non-finite.
/// - `CalculationError` when an amount overflows.
///
/// # Examples
///
/// ```no_run
/// use fare_engine::calculation::calculate_fare;
/// use fare_engine::config::ConfigLoader;
/// use fare_engine::models::TripRequest;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let loader = ConfigLoader::load("config/standard").unwrap();
/// let timestamp = NaiveDateTime::parse_from_str("2026-01-14 14:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
///
/// let breakdown = calculate_fare(&TripRequest::new(0.0, 0.0, timestamp), loader.rates()).unwrap();
/// assert_eq!(breakdown.base_fare, Decimal::from_str("12.00").unwrap());
/// assert_eq!(breakdown.total_including_vat, Decimal::from_str("14.52").unwrap());
/// ```
pub fn calculate_fare(trip: &TripRequest, rates: &RateTable) -> EngineResult<PriceBreakdown> {
    trip.validate()?;

    let base = calculate_base_fare(trip.distance_km, trip.duration_minutes, rates, 1)?;
    let surcharges = evaluate_surcharges(trip, base.base_fare, rates)?;
    let gross = base.base_fare + surcharges.surcharges.total;
    let discounts = evaluate_discounts(trip, gross, rates)?;

    let subtotal = (gross - discounts.discounts.total).max(Decimal::ZERO);
    let vat_amount = round_currency(subtotal * rates.vat_rate);
    let total = subtotal;
    let total_including_vat = total + vat_amount;

    let mut audit_trace = Vec::with_capacity(
        1 + surcharges.audit_steps.len() + discounts.audit_steps.len() + 1,
    );
    audit_trace.push(base.audit_step);
    audit_trace.extend(surcharges.audit_steps);
    audit_trace.extend(discounts.audit_steps);
    audit_trace.push(AuditStep {
        step_number: 0,
        rule_id: "totals".to_string(),
        rule_name: "Totals and VAT".to_string(),
        input: serde_json::json!({
            "base_fare": base.base_fare.to_string(),
            "surcharge_total": surcharges.surcharges.total.to_string(),
            "discount_total": discounts.discounts.total.to_string(),
            "vat_rate": rates.vat_rate.to_string()
        }),
        output: serde_json::json!({
            "subtotal": subtotal.to_string(),
            "vat_amount": vat_amount.to_string(),
            "total_including_vat": total_including_vat.to_string()
        }),
        reasoning: format!(
            "{} + {} - {} = {}; VAT {} × {} = {}",
            base.base_fare,
            surcharges.surcharges.total,
            discounts.discounts.total,
            subtotal,
            subtotal,
            rates.vat_rate,
            vat_amount
        ),
    });
    for (index, step) in audit_trace.iter_mut().enumerate() {
        step.step_number = index as u32 + 1;
    }

    debug!(
        base_fare = %base.base_fare,
        surcharges = %surcharges.surcharges.total,
        discounts = %discounts.discounts.total,
        total_including_vat = %total_including_vat,
        "Fare calculated"
    );

    Ok(PriceBreakdown {
        base_fare: base.base_fare,
        surcharges: surcharges.surcharges,
        discounts: discounts.discounts,
        subtotal,
        vat_rate: rates.vat_rate,
        vat_amount,
        total,
        total_including_vat,
        currency: rates.currency.clone(),
        audit_trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::error::EngineError;
    use crate::models::LineItemKind;
    use chrono::NaiveDateTime;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn load_rates() -> RateTable {
        ConfigLoader::load("config/standard")
            .expect("Failed to load config")
            .into_rates()
    }

    fn weekday_trip(distance_km: f64, duration_minutes: f64, time: &str) -> TripRequest {
        TripRequest::new(distance_km, duration_minutes, make_datetime("2026-01-14", time))
    }

    // ==========================================================================
    // Reference scenarios
    // ==========================================================================

    #[test]
    fn test_zero_trip_pays_minimum_fare_plus_vat() {
        let rates = load_rates();
        let breakdown = calculate_fare(&weekday_trip(0.0, 0.0, "14:00:00"), &rates).unwrap();

        assert_eq!(breakdown.base_fare, dec("12.00"));
        assert_eq!(breakdown.subtotal, dec("12.00"));
        assert_eq!(breakdown.vat_amount, dec("2.52"));
        assert_eq!(breakdown.total_including_vat, dec("14.52"));
        assert_eq!(breakdown.currency, "EUR");
    }

    #[test]
    fn test_weekday_afternoon_trip() {
        let rates = load_rates();
        let breakdown = calculate_fare(&weekday_trip(10.0, 20.0, "14:00:00"), &rates).unwrap();

        assert_eq!(breakdown.base_fare, dec("42.50"));
        assert!(breakdown.surcharges.items.is_empty());
        assert!(breakdown.discounts.items.is_empty());
        assert_eq!(breakdown.subtotal, dec("42.50"));
        // 42.50 × 0.21 = 8.925
        assert_eq!(breakdown.vat_amount, dec("8.93"));
        assert_eq!(breakdown.total_including_vat, dec("51.43"));
    }

    #[test]
    fn test_night_trip_has_one_night_surcharge() {
        let rates = load_rates();
        let breakdown = calculate_fare(&weekday_trip(10.0, 20.0, "23:30:00"), &rates).unwrap();

        let night: Vec<_> = breakdown
            .surcharges
            .items
            .iter()
            .filter(|i| i.kind == LineItemKind::Night)
            .collect();
        assert_eq!(night.len(), 1);
        assert_eq!(breakdown.subtotal, dec("45.00"));
        assert!(breakdown.total > Decimal::ZERO);
    }

    #[test]
    fn test_unknown_promo_code_is_not_an_error() {
        let rates = load_rates();
        let mut trip = weekday_trip(10.0, 20.0, "14:00:00");
        trip.promo_code = Some("UNKNOWN123".to_string());

        let breakdown = calculate_fare(&trip, &rates).unwrap();
        assert!(breakdown.discounts.items.is_empty());
        assert_eq!(breakdown.discounts.total, Decimal::ZERO);
    }

    #[test]
    fn test_negative_distance_is_rejected() {
        let rates = load_rates();
        match calculate_fare(&weekday_trip(-1.0, 20.0, "14:00:00"), &rates) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "distance_km"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_two_pets() {
        let rates = load_rates();
        let mut trip = weekday_trip(10.0, 20.0, "14:00:00");
        trip.pet_count = 2;

        let breakdown = calculate_fare(&trip, &rates).unwrap();
        let pets: Vec<_> = breakdown
            .surcharges
            .items
            .iter()
            .filter(|i| i.kind == LineItemKind::Pet)
            .collect();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].amount, dec("7.00"));
    }

    // ==========================================================================
    // Totals
    // ==========================================================================

    #[test]
    fn test_subtotal_identity_with_surcharges_and_discounts() {
        let rates = load_rates();
        let mut trip = weekday_trip(10.0, 20.0, "23:30:00");
        trip.large_luggage_count = 1;
        trip.is_round_trip = true;
        trip.promo_code = Some("welcome10".to_string());

        let b = calculate_fare(&trip, &rates).unwrap();
        assert_eq!(
            b.subtotal,
            b.base_fare + b.surcharges.total - b.discounts.total
        );
        // 42.50 + 2.50 + 1.50 = 46.50; 20% off = 9.30
        assert_eq!(b.discounts.total, dec("9.30"));
        assert_eq!(b.subtotal, dec("37.20"));
        assert_eq!(b.total_including_vat, b.total + b.vat_amount);
    }

    #[test]
    fn test_maximum_discount_keeps_subtotal_positive() {
        let rates = load_rates();
        let mut trip = weekday_trip(10.0, 20.0, "14:00:00");
        trip.is_round_trip = true;
        trip.is_frequent_rider = true;
        trip.promo_code = Some("HALFPRICE".to_string());

        let breakdown = calculate_fare(&trip, &rates).unwrap();
        assert_eq!(breakdown.discounts.total, dec("21.25"));
        assert_eq!(breakdown.subtotal, dec("21.25"));
        assert!(breakdown.subtotal >= Decimal::ZERO);
    }

    #[test]
    fn test_reservation_paid_by_credit_card() {
        let rates = load_rates();
        let mut trip = weekday_trip(10.0, 20.0, "14:00:00");
        trip.is_reservation = true;
        trip.payment_method = crate::models::PaymentMethod::CreditCard;

        let b = calculate_fare(&trip, &rates).unwrap();
        // 42.50 + 2.50 + 1.50
        assert_eq!(b.subtotal, dec("46.50"));
        // 46.50 × 0.21 = 9.765
        assert_eq!(b.vat_amount, dec("9.77"));
        assert_eq!(b.total_including_vat, dec("56.27"));
    }

    #[test]
    fn test_promo_expiry_uses_pickup_date() {
        let rates = load_rates();
        let mut before = TripRequest::new(10.0, 20.0, make_datetime("2026-05-31", "14:00:00"));
        before.promo_code = Some("SPRING15".to_string());
        let mut after = before.clone();
        after.timestamp = make_datetime("2026-06-01", "14:00:00");

        // 2026-05-31 is a Sunday: 42.50 + 3.00 weekend = 45.50; 15% = 6.83
        let b = calculate_fare(&before, &rates).unwrap();
        assert_eq!(b.discounts.total, dec("6.83"));

        let a = calculate_fare(&after, &rates).unwrap();
        assert_eq!(a.discounts.total, Decimal::ZERO);
    }

    #[test]
    fn test_audit_trace_is_numbered_sequentially() {
        let rates = load_rates();
        let breakdown = calculate_fare(&weekday_trip(10.0, 20.0, "14:00:00"), &rates).unwrap();

        // base + 11 surcharge rules + 3 discount rules + combination + totals
        assert_eq!(breakdown.audit_trace.len(), 17);
        for (index, step) in breakdown.audit_trace.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
        assert_eq!(breakdown.audit_trace[0].rule_id, "base_fare");
        assert_eq!(breakdown.audit_trace[16].rule_id, "totals");
    }

    #[test]
    fn test_calculation_is_deterministic() {
        let rates = load_rates();
        let mut trip = weekday_trip(17.3, 31.0, "23:45:00");
        trip.dropoff_label = "Schiphol".to_string();
        trip.waiting_minutes = 7.5;

        let first = calculate_fare(&trip, &rates).unwrap();
        let second = calculate_fare(&trip, &rates).unwrap();
        assert_eq!(first, second);
    }
}
