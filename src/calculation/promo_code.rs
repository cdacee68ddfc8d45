//! Promo code lookup.
//!
//! A code can carry a last valid pickup date and a minimum fare. Both are
//! checked against the trip, never against the clock.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{PromoCode, RateTable};

/// Why a promo code was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoCodeRejection {
    /// No code given.
    Empty,
    /// The code is not configured.
    Unknown,
    /// The pickup is after the code's last valid date.
    Expired,
    /// The fare is below the code's minimum.
    BelowMinimum,
}

impl PromoCodeRejection {
    /// A short explanation for riders and the audit trace.
    pub fn message(&self) -> &'static str {
        match self {
            PromoCodeRejection::Empty => "no code given",
            PromoCodeRejection::Unknown => "unknown",
            PromoCodeRejection::Expired => "expired",
            PromoCodeRejection::BelowMinimum => "fare below the minimum",
        }
    }
}

/// The result of checking a promo code.
///
/// Rejected codes are reported as invalid with a zero fraction; they are
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCodeValidation {
    /// The code after trimming and uppercasing.
    pub code: String,
    /// Whether the code applies.
    pub is_valid: bool,
    /// Fraction off the fare; zero when invalid.
    pub discount_fraction: Decimal,
    /// Why the code does not apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<PromoCodeRejection>,
}

impl PromoCodeValidation {
    fn accepted(code: String, promo: &PromoCode) -> Self {
        Self {
            code,
            is_valid: true,
            discount_fraction: promo.fraction,
            rejection: None,
        }
    }

    fn rejected(code: String, rejection: PromoCodeRejection) -> Self {
        Self {
            code,
            is_valid: false,
            discount_fraction: Decimal::ZERO,
            rejection: Some(rejection),
        }
    }
}

/// Normalizes a code the way the rate table stores them.
pub fn normalize_promo_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Looks up a configured code, ignoring case and surrounding whitespace.
pub fn lookup_promo_code<'a>(code: &str, rates: &'a RateTable) -> Option<&'a PromoCode> {
    let code = normalize_promo_code(code);
    if code.is_empty() {
        return None;
    }
    rates.discount_rates.promo_codes.get(&code)
}

/// Checks whether a promo code is configured.
///
/// Expiry and minimum fare are not checked; [`check_promo_code`] does that
/// for a concrete trip.
///
/// # Examples
///
/// ```no_run
/// use fare_engine::calculation::validate_promo_code;
/// use fare_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/standard").unwrap();
///
/// let result = validate_promo_code(" welcome10 ", loader.rates());
/// assert!(result.is_valid);
/// assert_eq!(result.code, "WELCOME10");
///
/// let result = validate_promo_code("UNKNOWN123", loader.rates());
/// assert!(!result.is_valid);
/// assert_eq!(result.discount_fraction, Decimal::ZERO);
/// ```
pub fn validate_promo_code(code: &str, rates: &RateTable) -> PromoCodeValidation {
    let normalized = normalize_promo_code(code);
    match lookup_promo_code(&normalized, rates) {
        Some(promo) => PromoCodeValidation::accepted(normalized, promo),
        None => PromoCodeValidation::rejected(normalized, missing_reason(code)),
    }
}

/// Checks a promo code for a trip picked up at `pickup_time`.
///
/// The code must be configured, `pickup_time` must fall on or before its
/// `valid_until` date, and `gross` (when known) must reach its `min_amount`.
pub fn check_promo_code(
    code: &str,
    pickup_time: NaiveDateTime,
    gross: Option<Decimal>,
    rates: &RateTable,
) -> PromoCodeValidation {
    let normalized = normalize_promo_code(code);
    let Some(promo) = lookup_promo_code(&normalized, rates) else {
        return PromoCodeValidation::rejected(normalized, missing_reason(code));
    };

    if promo.valid_until.is_some_and(|last| pickup_time.date() > last) {
        return PromoCodeValidation::rejected(normalized, PromoCodeRejection::Expired);
    }
    if let (Some(min_amount), Some(gross)) = (promo.min_amount, gross) {
        if gross < min_amount {
            return PromoCodeValidation::rejected(normalized, PromoCodeRejection::BelowMinimum);
        }
    }

    PromoCodeValidation::accepted(normalized, promo)
}

fn missing_reason(code: &str) -> PromoCodeRejection {
    if code.trim().is_empty() {
        PromoCodeRejection::Empty
    } else {
        PromoCodeRejection::Unknown
    }
}
