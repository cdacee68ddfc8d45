//! Trip request model.
//!
//! A [`TripRequest`] carries the facts of a single trip as supplied by the
//! booking form and the routing provider.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

fn default_passenger_count() -> i32 {
    1
}

/// How the rider pays.
///
/// ```
/// use fare_engine::models::PaymentMethod;
///
/// let method: PaymentMethod = serde_json::from_str("\"creditcard\"").unwrap();
/// assert_eq!(method, PaymentMethod::CreditCard);
/// assert_eq!(PaymentMethod::default(), PaymentMethod::Pin);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash to the driver.
    Cash,
    /// Debit card at the terminal.
    #[default]
    Pin,
    /// Credit card.
    #[serde(alias = "creditcard")]
    CreditCard,
}

impl PaymentMethod {
    /// The snake_case identifier, as serialized.
    pub fn id(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Pin => "pin",
            PaymentMethod::CreditCard => "credit_card",
        }
    }
}

/// The facts of a trip needed to price it.
///
/// Counts are signed so that negative input survives deserialization and is
/// rejected by [`TripRequest::validate`] instead of silently wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    /// Route distance in kilometres.
    pub distance_km: f64,
    /// Expected driving time in minutes.
    pub duration_minutes: f64,
    /// Local pickup time; drives night, weekend and holiday rules.
    pub timestamp: NaiveDateTime,
    /// Pickup address as entered.
    #[serde(default)]
    pub pickup_label: String,
    /// Dropoff address as entered.
    #[serde(default)]
    pub dropoff_label: String,
    /// Number of passengers.
    #[serde(default = "default_passenger_count")]
    pub passenger_count: i32,
    /// Number of pets.
    #[serde(default)]
    pub pet_count: i32,
    /// Number of large pieces of luggage.
    #[serde(default)]
    pub large_luggage_count: i32,
    /// Number of small pieces of luggage.
    #[serde(default)]
    pub small_luggage_count: i32,
    /// Minutes the driver is expected to wait.
    #[serde(default)]
    pub waiting_minutes: f64,
    /// Whether the trip is booked in advance rather than hailed.
    #[serde(default)]
    pub is_reservation: bool,
    /// How the rider pays.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Whether the booking includes the return leg.
    #[serde(default)]
    pub is_round_trip: bool,
    /// Whether the rider qualifies as frequent; resolved by the caller.
    #[serde(default)]
    pub is_frequent_rider: bool,
    /// Promo code as typed by the rider.
    #[serde(default)]
    pub promo_code: Option<String>,
}

impl TripRequest {
    /// Creates a request with the given route facts and every option at its
    /// default (one passenger, no extras).
    ///
    /// # Examples
    ///
    /// ```
    /// use fare_engine::models::TripRequest;
    /// use chrono::NaiveDateTime;
    ///
    /// let timestamp = NaiveDateTime::parse_from_str("2026-01-14 14:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let trip = TripRequest::new(10.0, 20.0, timestamp);
    /// assert_eq!(trip.passenger_count, 1);
    /// assert!(trip.validate().is_ok());
    /// ```
    pub fn new(distance_km: f64, duration_minutes: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            distance_km,
            duration_minutes,
            timestamp,
            pickup_label: String::new(),
            dropoff_label: String::new(),
            passenger_count: default_passenger_count(),
            pet_count: 0,
            large_luggage_count: 0,
            small_luggage_count: 0,
            waiting_minutes: 0.0,
            is_reservation: false,
            payment_method: PaymentMethod::default(),
            is_round_trip: false,
            is_frequent_rider: false,
            promo_code: None,
        }
    }

    /// Checks every numeric field.
    ///
    /// Fails with `InvalidInput` naming the first offending field.
    pub fn validate(&self) -> EngineResult<()> {
        validate_measure("distance_km", self.distance_km)?;
        validate_measure("duration_minutes", self.duration_minutes)?;
        validate_measure("waiting_minutes", self.waiting_minutes)?;
        validate_count("passenger_count", self.passenger_count)?;
        validate_count("pet_count", self.pet_count)?;
        validate_count("large_luggage_count", self.large_luggage_count)?;
        validate_count("small_luggage_count", self.small_luggage_count)?;
        Ok(())
    }
}

/// Rejects NaN, infinities and negative values.
pub(crate) fn validate_measure(field: &str, value: f64) -> EngineResult<()> {
    if !value.is_finite() {
        return Err(EngineError::invalid_input(field, format!("{} is not finite", value)));
    }
    if value < 0.0 {
        return Err(EngineError::invalid_input(field, format!("{} is negative", value)));
    }
    Ok(())
}

fn validate_count(field: &str, value: i32) -> EngineResult<()> {
    if value < 0 {
        return Err(EngineError::invalid_input(field, format!("{} is negative", value)));
    }
    Ok(())
}
