//! Discount evaluation and combination.
//!
//! Fired discount fractions are summed, not compounded, and the sum is capped
//! at the rate table's `max_combined_discount_fraction`. The combined
//! fraction is applied once to the gross fare (base fare plus surcharges).
//!
//! When the cap binds, every fired discount keeps its share of the cap in
//! proportion to its configured fraction. Item amounts are rounded
//! cumulatively so they always add up to the rounded discount total.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::RateTable;
use crate::error::{EngineError, EngineResult};
use crate::models::{AdjustmentSummary, AuditStep, LineItem, LineItemKind, TripRequest};

use super::promo_code::{PromoCodeValidation, check_promo_code};
use super::rounding::round_currency;

/// The fired discounts and the audit steps of every rule evaluated.
#[derive(Debug, Clone)]
pub struct DiscountEvaluation {
    /// Fired discount items and their total.
    pub discounts: AdjustmentSummary,
    /// The fraction actually applied, after capping.
    pub combined_fraction: Decimal,
    /// Whether the cap reduced the combined fraction.
    pub capped: bool,
    /// One step per discount rule plus the combination step, numbered from 1.
    pub audit_steps: Vec<AuditStep>,
}

/// A discount rule that fired, before combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredDiscount {
    /// Which discount.
    pub kind: LineItemKind,
    /// Configured fraction off.
    pub fraction: Decimal,
}

/// Evaluates the round trip, frequent rider and promo code discounts and
/// combines them against `gross`.
///
/// # Errors
///
/// `InvalidInput` when `gross` is negative.
pub fn evaluate_discounts(
    trip: &TripRequest,
    gross: Decimal,
    rates: &RateTable,
) -> EngineResult<DiscountEvaluation> {
    if gross < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross",
            format!("{} is negative", gross),
        ));
    }

    let discount_rates = &rates.discount_rates;
    let mut fired = Vec::new();
    let mut audit_steps = Vec::with_capacity(4);

    let round_trip = trip.is_round_trip.then_some(discount_rates.round_trip);
    audit_steps.push(flag_audit_step(
        LineItemKind::RoundTrip,
        1,
        trip.is_round_trip,
        round_trip,
    ));
    if let Some(fraction) = round_trip {
        fired.push(FiredDiscount {
            kind: LineItemKind::RoundTrip,
            fraction,
        });
    }

    let frequent = trip
        .is_frequent_rider
        .then_some(discount_rates.frequent_rider);
    audit_steps.push(flag_audit_step(
        LineItemKind::FrequentRider,
        2,
        trip.is_frequent_rider,
        frequent,
    ));
    if let Some(fraction) = frequent {
        fired.push(FiredDiscount {
            kind: LineItemKind::FrequentRider,
            fraction,
        });
    }

    let promo = trip
        .promo_code
        .as_deref()
        .map(|code| check_promo_code(code, trip.timestamp, Some(gross), rates));
    audit_steps.push(promo_audit_step(3, promo.as_ref(), gross));
    if let Some(validation) = promo.as_ref().filter(|v| v.is_valid) {
        fired.push(FiredDiscount {
            kind: LineItemKind::PromoCode,
            fraction: validation.discount_fraction,
        });
    }

    let combination = combine_discounts(&fired, gross, rates.max_combined_discount_fraction);
    for item in &combination.discounts.items {
        debug!(kind = item.kind.id(), amount = %item.amount, "Discount applied");
    }

    audit_steps.push(AuditStep {
        step_number: 4,
        rule_id: "discount_combination".to_string(),
        rule_name: "Discount Combination".to_string(),
        input: serde_json::json!({
            "gross": gross.to_string(),
            "fractions": fired
                .iter()
                .map(|d| serde_json::json!({"kind": d.kind.id(), "fraction": d.fraction.to_string()}))
                .collect::<Vec<_>>(),
            "cap": rates.max_combined_discount_fraction.to_string()
        }),
        output: serde_json::json!({
            "combined_fraction": combination.combined_fraction.normalize().to_string(),
            "capped": combination.capped,
            "total": combination.discounts.total.to_string()
        }),
        reasoning: combination.reasoning(gross, rates.max_combined_discount_fraction),
    });

    Ok(DiscountEvaluation {
        discounts: combination.discounts,
        combined_fraction: combination.combined_fraction,
        capped: combination.capped,
        audit_steps,
    })
}

/// The combined discount for a set of fired discounts.
#[derive(Debug, Clone)]
pub struct DiscountCombination {
    /// Items in the order they fired, summing to the total.
    pub discounts: AdjustmentSummary,
    /// `min(Σ fractions, cap)`.
    pub combined_fraction: Decimal,
    /// Whether the cap bound.
    pub capped: bool,
    /// `Σ fractions` before capping.
    pub uncapped_fraction: Decimal,
}

impl DiscountCombination {
    fn reasoning(&self, gross: Decimal, cap: Decimal) -> String {
        if self.discounts.items.is_empty() {
            return "No discounts apply".to_string();
        }
        if self.capped {
            format!(
                "Combined fraction {} exceeds the cap {}; {} × {} = {}",
                self.uncapped_fraction.normalize(),
                cap.normalize(),
                gross,
                cap.normalize(),
                self.discounts.total
            )
        } else {
            format!(
                "{} × {} = {}",
                gross,
                self.combined_fraction.normalize(),
                self.discounts.total
            )
        }
    }
}

/// Sums the fired fractions, caps them, and allocates the rounded total over
/// the fired discounts.
///
/// `cap` is clamped to `[0, 1]`, so the total never exceeds `gross`.
///
/// # Examples
///
/// ```
/// use fare_engine::calculation::{combine_discounts, FiredDiscount};
/// use fare_engine::models::LineItemKind;
/// use rust_decimal::Decimal;
///
/// let fired = [
///     FiredDiscount { kind: LineItemKind::RoundTrip, fraction: Decimal::new(10, 2) },
///     FiredDiscount { kind: LineItemKind::PromoCode, fraction: Decimal::new(50, 2) },
/// ];
/// let combination = combine_discounts(&fired, Decimal::new(4000, 2), Decimal::new(50, 2));
///
/// assert!(combination.capped);
/// assert_eq!(combination.discounts.total, Decimal::new(2000, 2));
/// ```
pub fn combine_discounts(fired: &[FiredDiscount], gross: Decimal, cap: Decimal) -> DiscountCombination {
    let cap = cap.clamp(Decimal::ZERO, Decimal::ONE);
    let fired: Vec<&FiredDiscount> = fired.iter().filter(|d| d.fraction > Decimal::ZERO).collect();
    let uncapped_fraction: Decimal = fired.iter().map(|d| d.fraction).sum();
    let capped = uncapped_fraction > cap;
    let combined_fraction = uncapped_fraction.min(cap);

    let mut items = Vec::with_capacity(fired.len());
    let mut cumulative_fraction = Decimal::ZERO;
    let mut allocated = Decimal::ZERO;
    for (index, discount) in fired.iter().enumerate() {
        cumulative_fraction += discount.fraction;

        let effective_cumulative = if index + 1 == fired.len() {
            combined_fraction
        } else if capped {
            cumulative_fraction * cap / uncapped_fraction
        } else {
            cumulative_fraction
        };
        let cumulative_amount = round_currency(effective_cumulative * gross);
        let amount = cumulative_amount - allocated;
        allocated = cumulative_amount;

        if amount.is_zero() {
            continue;
        }

        let effective_fraction = if capped {
            discount.fraction * cap / uncapped_fraction
        } else {
            discount.fraction
        };
        let mut item = LineItem::new(discount.kind, gross, effective_fraction.normalize(), amount);
        if capped {
            item.description = format!("{} (capped)", discount.kind.description());
        }
        items.push(item);
    }

    DiscountCombination {
        discounts: AdjustmentSummary::from_items(items),
        combined_fraction,
        capped,
        uncapped_fraction,
    }
}

fn flag_audit_step(
    kind: LineItemKind,
    step_number: u32,
    flag: bool,
    fraction: Option<Decimal>,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: format!("{}_discount", kind.id()),
        rule_name: kind.description().to_string(),
        input: serde_json::json!({
            "flag": kind.id(),
            "set": flag
        }),
        output: serde_json::json!({
            "applies": fraction.is_some(),
            "fraction": fraction.map(|f| f.to_string())
        }),
        reasoning: match fraction {
            Some(f) => format!("Flag set; fraction {}", f),
            None => "Flag not set".to_string(),
        },
    }
}

fn promo_audit_step(
    step_number: u32,
    validation: Option<&PromoCodeValidation>,
    gross: Decimal,
) -> AuditStep {
    let reasoning = match validation {
        Some(v) if v.is_valid => {
            format!("Promo code {} grants fraction {}", v.code, v.discount_fraction)
        }
        Some(v) => match v.rejection {
            Some(rejection) if !v.code.is_empty() => {
                format!("Promo code {}: {}; no discount", v.code, rejection.message())
            }
            _ => "No promo code given".to_string(),
        },
        None => "No promo code given".to_string(),
    };
    let applies = validation.is_some_and(|v| v.is_valid);

    AuditStep {
        step_number,
        rule_id: "promo_code_discount".to_string(),
        rule_name: LineItemKind::PromoCode.description().to_string(),
        input: serde_json::json!({
            "promo_code": validation.map(|v| v.code.as_str()),
            "gross": gross.to_string()
        }),
        output: serde_json::json!({
            "applies": applies,
            "fraction": validation.filter(|v| v.is_valid).map(|v| v.discount_fraction.to_string()),
            "rejection": validation.and_then(|v| v.rejection)
        }),
        reasoning,
    }
}
