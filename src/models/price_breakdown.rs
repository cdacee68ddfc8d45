//! Price breakdown models for the fare engine.
//!
//! This module contains the [`PriceBreakdown`] type and its associated
//! structures that capture all outputs of a fare calculation, including
//! surcharge and discount line items, totals, and an audit trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies the rule behind a line item.
///
/// # Example
///
/// ```
/// use fare_engine::models::LineItemKind;
///
/// let kind = LineItemKind::LargeLuggage;
/// assert_eq!(serde_json::to_string(&kind).unwrap(), "\"large_luggage\"");
/// assert!(!kind.is_discount());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    /// Night-time surcharge.
    Night,
    /// Weekend surcharge.
    Weekend,
    /// Public holiday surcharge.
    Holiday,
    /// Airport pickup or dropoff surcharge.
    Airport,
    /// Per-pet surcharge.
    Pet,
    /// Per-piece large luggage surcharge.
    LargeLuggage,
    /// Per-piece small luggage surcharge.
    SmallLuggage,
    /// Surcharge for passengers above the free allowance.
    ExtraPassenger,
    /// Surcharge for billed waiting minutes.
    Waiting,
    /// Advance booking surcharge.
    Reservation,
    /// Surcharge for the chosen payment method.
    PaymentMethod,
    /// Round trip discount.
    RoundTrip,
    /// Frequent rider discount.
    FrequentRider,
    /// Promo code discount.
    PromoCode,
}

impl LineItemKind {
    /// Returns true for the discount kinds.
    pub fn is_discount(&self) -> bool {
        matches!(
            self,
            LineItemKind::RoundTrip | LineItemKind::FrequentRider | LineItemKind::PromoCode
        )
    }

    /// The snake_case identifier, as serialized and used for audit rule ids.
    pub fn id(&self) -> &'static str {
        match self {
            LineItemKind::Night => "night",
            LineItemKind::Weekend => "weekend",
            LineItemKind::Holiday => "holiday",
            LineItemKind::Airport => "airport",
            LineItemKind::Pet => "pet",
            LineItemKind::LargeLuggage => "large_luggage",
            LineItemKind::SmallLuggage => "small_luggage",
            LineItemKind::ExtraPassenger => "extra_passenger",
            LineItemKind::Waiting => "waiting",
            LineItemKind::Reservation => "reservation",
            LineItemKind::PaymentMethod => "payment_method",
            LineItemKind::RoundTrip => "round_trip",
            LineItemKind::FrequentRider => "frequent_rider",
            LineItemKind::PromoCode => "promo_code",
        }
    }

    /// A human-readable label for the breakdown.
    pub fn description(&self) -> &'static str {
        match self {
            LineItemKind::Night => "Night surcharge",
            LineItemKind::Weekend => "Weekend surcharge",
            LineItemKind::Holiday => "Holiday surcharge",
            LineItemKind::Airport => "Airport surcharge",
            LineItemKind::Pet => "Pet surcharge",
            LineItemKind::LargeLuggage => "Large luggage surcharge",
            LineItemKind::SmallLuggage => "Small luggage surcharge",
            LineItemKind::ExtraPassenger => "Extra passenger surcharge",
            LineItemKind::Waiting => "Waiting time",
            LineItemKind::Reservation => "Reservation surcharge",
            LineItemKind::PaymentMethod => "Payment method surcharge",
            LineItemKind::RoundTrip => "Round trip discount",
            LineItemKind::FrequentRider => "Frequent rider discount",
            LineItemKind::PromoCode => "Promo code discount",
        }
    }
}

/// A single surcharge or discount in a breakdown.
///
/// For per-unit surcharges `units × rate` gives the amount before rounding.
/// For time-based surcharges `units` is 1 and `rate` is the unrounded amount.
/// For discounts `rate` is the fraction applied and `units` is the gross it
/// was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Which rule produced this item.
    pub kind: LineItemKind,
    /// Human-readable label.
    pub description: String,
    /// Quantity the rate applies to.
    pub units: Decimal,
    /// Rate per unit.
    pub rate: Decimal,
    /// Amount rounded to cents. Always positive; discounts are subtracted.
    pub amount: Decimal,
}

impl LineItem {
    /// Creates a line item labelled with the kind's default description.
    pub fn new(kind: LineItemKind, units: Decimal, rate: Decimal, amount: Decimal) -> Self {
        Self {
            kind,
            description: kind.description().to_string(),
            units,
            rate,
            amount,
        }
    }
}

/// An ordered list of line items with their sum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentSummary {
    /// The fired items, in rule evaluation order.
    pub items: Vec<LineItem>,
    /// Sum of the item amounts.
    pub total: Decimal,
}

impl AdjustmentSummary {
    /// Builds a summary, totalling the item amounts.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let total = items.iter().map(|item| item.amount).sum();
        Self { items, total }
    }

    /// Finds the item of the given kind, if it fired.
    pub fn find(&self, kind: LineItemKind) -> Option<&LineItem> {
        self.items.iter().find(|item| item.kind == kind)
    }
}

/// A single step in the audit trace recording a rule evaluation.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The outcome of evaluating one surcharge or discount rule.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    /// The line item, when the rule fired.
    pub item: Option<LineItem>,
    /// The audit step recording this evaluation.
    pub audit_step: AuditStep,
}

/// The amount handed to the payment provider.
///
/// `value` always carries exactly two decimals, as iDEAL/Mollie payment
/// requests expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAmount {
    /// ISO currency code.
    pub currency: String,
    /// Amount with two decimals, e.g. "14.52".
    pub value: String,
}

/// The complete, deterministic result of a fare calculation.
///
/// # Example
///
/// ```
/// use fare_engine::models::{AdjustmentSummary, PriceBreakdown};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let breakdown = PriceBreakdown {
///     base_fare: Decimal::from_str("12.00").unwrap(),
///     surcharges: AdjustmentSummary::default(),
///     discounts: AdjustmentSummary::default(),
///     subtotal: Decimal::from_str("12.00").unwrap(),
///     vat_rate: Decimal::from_str("0.21").unwrap(),
///     vat_amount: Decimal::from_str("2.52").unwrap(),
///     total: Decimal::from_str("12.00").unwrap(),
///     total_including_vat: Decimal::from_str("14.52").unwrap(),
///     currency: "EUR".to_string(),
///     audit_trace: vec![],
/// };
/// assert_eq!(breakdown.payment_amount().value, "14.52");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Base fare after min/max clamping.
    pub base_fare: Decimal,
    /// Fired surcharges.
    pub surcharges: AdjustmentSummary,
    /// Fired discounts.
    pub discounts: AdjustmentSummary,
    /// `base_fare + surcharges.total - discounts.total`, never negative.
    pub subtotal: Decimal,
    /// VAT fraction used.
    pub vat_rate: Decimal,
    /// VAT on the subtotal, rounded to cents.
    pub vat_amount: Decimal,
    /// Price excluding VAT.
    pub total: Decimal,
    /// Price including VAT.
    pub total_including_vat: Decimal,
    /// ISO currency code.
    pub currency: String,
    /// Every rule evaluation, in order.
    pub audit_trace: Vec<AuditStep>,
}

impl PriceBreakdown {
    /// The amount to request from the payment provider.
    pub fn payment_amount(&self) -> PaymentAmount {
        let mut value = self.total_including_vat;
        value.rescale(2);
        PaymentAmount {
            currency: self.currency.clone(),
            value: value.to_string(),
        }
    }
}
