//! Request types for the fare engine API.
//!
//! This module defines the JSON request structures for the `/quote` and
//! `/promo-codes/validate` endpoints.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PaymentMethod, TripRequest};

fn default_passengers() -> i32 {
    1
}

/// Request body for the `/quote` endpoint.
///
/// Mirrors the booking form. Route facts come from the routing provider;
/// everything else is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Route distance in kilometres.
    pub distance_km: f64,
    /// Expected driving time in minutes.
    pub duration_minutes: f64,
    /// Local pickup date and time, e.g. `2026-01-14T23:30:00`.
    pub pickup_time: NaiveDateTime,
    /// Pickup address.
    #[serde(default)]
    pub pickup_address: String,
    /// Dropoff address.
    #[serde(default)]
    pub dropoff_address: String,
    /// Number of passengers.
    #[serde(default = "default_passengers")]
    pub passengers: i32,
    /// Number of pets.
    #[serde(default)]
    pub pets: i32,
    /// Number of large suitcases.
    #[serde(default)]
    pub large_luggage: i32,
    /// Number of small bags.
    #[serde(default)]
    pub small_luggage: i32,
    /// Minutes the driver should wait.
    #[serde(default)]
    pub waiting_minutes: f64,
    /// Whether the ride is booked in advance.
    #[serde(default)]
    pub reservation: bool,
    /// `cash`, `pin` or `credit_card`; defaults to `pin`.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Whether a return trip is booked.
    #[serde(default)]
    pub round_trip: bool,
    /// Whether the customer is a frequent rider.
    #[serde(default)]
    pub frequent_rider: bool,
    /// Optional promo code.
    #[serde(default)]
    pub promo_code: Option<String>,
}

impl From<QuoteRequest> for TripRequest {
    fn from(req: QuoteRequest) -> Self {
        TripRequest {
            distance_km: req.distance_km,
            duration_minutes: req.duration_minutes,
            timestamp: req.pickup_time,
            pickup_label: req.pickup_address,
            dropoff_label: req.dropoff_address,
            passenger_count: req.passengers,
            pet_count: req.pets,
            large_luggage_count: req.large_luggage,
            small_luggage_count: req.small_luggage,
            waiting_minutes: req.waiting_minutes,
            is_reservation: req.reservation,
            payment_method: req.payment_method,
            is_round_trip: req.round_trip,
            is_frequent_rider: req.frequent_rider,
            promo_code: req.promo_code,
        }
    }
}

/// Request body for the `/promo-codes/validate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCodeRequest {
    /// The code as typed.
    pub code: String,
    /// Planned pickup, checked against the code's last valid date.
    #[serde(default)]
    pub pickup_time: Option<NaiveDateTime>,
    /// Fare before discounts, checked against the code's minimum.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_quote_request_uses_defaults() {
        let json = r#"{
            "distance_km": 10,
            "duration_minutes": 20,
            "pickup_time": "2026-01-14T14:00:00"
        }"#;

        let request: QuoteRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.passengers, 1);
        assert_eq!(request.pets, 0);
        assert!(request.promo_code.is_none());

        let trip: TripRequest = request.into();
        assert_eq!(trip.distance_km, 10.0);
        assert_eq!(trip.passenger_count, 1);
        assert!(trip.pickup_label.is_empty());
        assert!(!trip.is_reservation);
        assert_eq!(trip.payment_method, PaymentMethod::Pin);
    }

    #[test]
    fn test_promo_code_request_optional_context() {
        let bare: PromoCodeRequest = serde_json::from_str(r#"{"code": "SUMMER25"}"#).unwrap();
        assert!(bare.pickup_time.is_none());
        assert!(bare.amount.is_none());

        let full: PromoCodeRequest = serde_json::from_str(
            r#"{"code": "SUMMER25", "pickup_time": "2026-07-01T10:00:00", "amount": "42.50"}"#,
        )
        .unwrap();
        assert_eq!(full.amount, Some(Decimal::new(4250, 2)));
    }

    #[test]
    fn test_quote_request_maps_every_field() {
        let json = r#"{
            "distance_km": 42.5,
            "duration_minutes": 35,
            "pickup_time": "2026-01-16T19:15:00",
            "pickup_address": "Stationsplein 1, Utrecht",
            "dropoff_address": "Schiphol",
            "passengers": 5,
            "pets": 1,
            "large_luggage": 2,
            "small_luggage": 3,
            "waiting_minutes": 4.5,
            "round_trip": true,
            "frequent_rider": true,
            "reservation": true,
            "payment_method": "creditcard",
            "promo_code": "welcome10"
        }"#;

        let trip: TripRequest = serde_json::from_str::<QuoteRequest>(json).unwrap().into();
        assert_eq!(trip.dropoff_label, "Schiphol");
        assert_eq!(trip.passenger_count, 5);
        assert_eq!(trip.pet_count, 1);
        assert_eq!(trip.large_luggage_count, 2);
        assert_eq!(trip.small_luggage_count, 3);
        assert_eq!(trip.waiting_minutes, 4.5);
        assert!(trip.is_round_trip);
        assert!(trip.is_frequent_rider);
        assert!(trip.is_reservation);
        assert_eq!(trip.payment_method, PaymentMethod::CreditCard);
        assert_eq!(trip.promo_code.as_deref(), Some("welcome10"));
    }

    #[test]
    fn test_missing_pickup_time_is_rejected() {
        let json = r#"{"distance_km": 10, "duration_minutes": 20}"#;
        let err = serde_json::from_str::<QuoteRequest>(json).unwrap_err();
        assert!(err.to_string().contains("missing field"));
    }
}
