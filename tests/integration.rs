//! Integration tests for the fare engine API.
//!
//! This test suite covers the pricing scenarios end to end:
//! - Base fare with minimum and maximum clamping
//! - Night, weekend, holiday and airport surcharges
//! - Per-unit fees (pets, luggage, passengers, waiting)
//! - Reservation and payment method fees
//! - Discounts, promo codes with expiry and minimum fare, and the discount cap
//! - VAT and payment amounts
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use fare_engine::api::{AppState, create_router};
use fare_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/standard").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

/// Normalize decimal string by removing trailing zeros after decimal point
fn normalize_decimal(s: &str) -> String {
    Decimal::from_str(s).unwrap().normalize().to_string()
}

async fn post_json(router: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_quote(body: Value) -> (StatusCode, Value) {
    post_json(create_router_for_test(), "/quote", body.to_string()).await
}

/// A 10 km / 20 min trip; base fare 42.50 under the standard tariff.
fn create_trip(pickup_time: &str) -> Value {
    json!({
        "distance_km": 10,
        "duration_minutes": 20,
        "pickup_time": pickup_time
    })
}

fn assert_amount(result: &Value, pointer: &str, expected: &str) {
    let actual = result
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("No amount at {} in {}", pointer, result));
    assert_eq!(
        normalize_decimal(actual),
        normalize_decimal(expected),
        "Expected {} at {}, got {}",
        expected,
        pointer,
        actual
    );
}

fn items<'a>(result: &'a Value, list: &str) -> &'a Vec<Value> {
    result["breakdown"][list]["items"].as_array().unwrap()
}

fn items_of_kind<'a>(result: &'a Value, list: &str, kind: &str) -> Vec<&'a Value> {
    items(result, list)
        .iter()
        .filter(|item| item["kind"] == kind)
        .collect()
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[tokio::test]
async fn test_zero_trip_pays_minimum_fare() {
    // 2026-01-14 is a Wednesday
    let body = json!({
        "distance_km": 0,
        "duration_minutes": 0,
        "pickup_time": "2026-01-14T14:00:00"
    });

    let (status, result) = post_quote(body).await;
    assert_eq!(status, StatusCode::OK);

    assert_amount(&result, "/breakdown/base_fare", "12.00");
    assert_amount(&result, "/breakdown/vat_amount", "2.52");
    assert_amount(&result, "/breakdown/total_including_vat", "14.52");
    assert_eq!(result["payment"]["value"], "14.52");
    assert_eq!(result["payment"]["currency"], "EUR");
    assert_eq!(result["formatted_total_including_vat"], "€ 14,52");
}

#[tokio::test]
async fn test_weekday_afternoon_trip() {
    let (status, result) = post_quote(create_trip("2026-01-14T14:00:00")).await;
    assert_eq!(status, StatusCode::OK);

    assert_amount(&result, "/breakdown/base_fare", "42.50");
    assert_amount(&result, "/breakdown/subtotal", "42.50");
    assert!(items(&result, "surcharges").is_empty());
    assert!(items(&result, "discounts").is_empty());
}

#[tokio::test]
async fn test_night_trip_has_exactly_one_night_surcharge() {
    let (status, result) = post_quote(create_trip("2026-01-14T23:30:00")).await;
    assert_eq!(status, StatusCode::OK);

    let night = items_of_kind(&result, "surcharges", "night");
    assert_eq!(night.len(), 1);
    assert_amount(night[0], "/amount", "2.50");

    let total = Decimal::from_str(result["breakdown"]["total"].as_str().unwrap()).unwrap();
    assert!(total > Decimal::ZERO);
}

#[tokio::test]
async fn test_unknown_promo_code_succeeds_without_discount() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["promo_code"] = json!("UNKNOWN123");

    let (status, result) = post_quote(body).await;
    assert_eq!(status, StatusCode::OK);

    assert!(items(&result, "discounts").is_empty());
    assert_amount(&result, "/breakdown/discounts/total", "0");
}

#[tokio::test]
async fn test_negative_distance_returns_invalid_input() {
    let body = json!({
        "distance_km": -1,
        "duration_minutes": 20,
        "pickup_time": "2026-01-14T14:00:00"
    });

    let (status, error) = post_quote(body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_INPUT");
    assert!(error["message"].as_str().unwrap().contains("distance_km"));
}

#[tokio::test]
async fn test_two_pets_give_one_pet_item() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["pets"] = json!(2);

    let (status, result) = post_quote(body).await;
    assert_eq!(status, StatusCode::OK);

    let pets = items_of_kind(&result, "surcharges", "pet");
    assert_eq!(pets.len(), 1);
    assert_amount(pets[0], "/amount", "7.00");
}

// =============================================================================
// Base fare
// =============================================================================

#[tokio::test]
async fn test_long_trip_is_capped_at_maximum_fare() {
    let body = json!({
        "distance_km": 300,
        "duration_minutes": 240,
        "pickup_time": "2026-01-14T14:00:00"
    });

    let (status, result) = post_quote(body).await;
    assert_eq!(status, StatusCode::OK);
    assert_amount(&result, "/breakdown/base_fare", "500.00");
    assert_eq!(result["formatted_total"], "€ 500,00");
}

// =============================================================================
// Surcharges
// =============================================================================

#[tokio::test]
async fn test_saturday_trip_pays_weekend_surcharge() {
    // 2026-01-17 is a Saturday
    let (status, result) = post_quote(create_trip("2026-01-17T12:00:00")).await;
    assert_eq!(status, StatusCode::OK);

    let weekend = items_of_kind(&result, "surcharges", "weekend");
    assert_eq!(weekend.len(), 1);
    assert_amount(weekend[0], "/amount", "3.00");
    assert_amount(&result, "/breakdown/subtotal", "45.50");
    // 45.50 × 0.21 = 9.555
    assert_amount(&result, "/breakdown/vat_amount", "9.56");
}

#[tokio::test]
async fn test_friday_afternoon_is_not_weekend() {
    // 2026-01-16 is a Friday
    let (_, result) = post_quote(create_trip("2026-01-16T17:00:00")).await;
    assert!(items_of_kind(&result, "surcharges", "weekend").is_empty());

    let (_, result) = post_quote(create_trip("2026-01-16T18:00:00")).await;
    assert_eq!(items_of_kind(&result, "surcharges", "weekend").len(), 1);
}

#[tokio::test]
async fn test_easter_monday_pays_holiday_surcharge() {
    // Easter Monday 2026, after the weekend window closes
    let (status, result) = post_quote(create_trip("2026-04-06T12:00:00")).await;
    assert_eq!(status, StatusCode::OK);

    let holiday = items_of_kind(&result, "surcharges", "holiday");
    assert_eq!(holiday.len(), 1);
    // 42.50 × 0.25 = 10.625
    assert_amount(holiday[0], "/amount", "10.63");
    assert!(items_of_kind(&result, "surcharges", "weekend").is_empty());
}

#[tokio::test]
async fn test_liberation_day_only_in_lustrum_years() {
    // Weekday noon in both years: 2025-05-05 is a Monday, 2026-05-05 a Tuesday
    let (_, result) = post_quote(create_trip("2025-05-05T12:00:00")).await;
    assert_eq!(items_of_kind(&result, "surcharges", "holiday").len(), 1);

    let (_, result) = post_quote(create_trip("2026-05-05T12:00:00")).await;
    assert!(items_of_kind(&result, "surcharges", "holiday").is_empty());
}

#[tokio::test]
async fn test_airport_to_airport_charged_once() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["pickup_address"] = json!("Schiphol, Aankomstpassage");
    body["dropoff_address"] = json!("Eindhoven Airport");

    let (status, result) = post_quote(body).await;
    assert_eq!(status, StatusCode::OK);

    let airport = items_of_kind(&result, "surcharges", "airport");
    assert_eq!(airport.len(), 1);
    assert_amount(airport[0], "/amount", "7.50");
}

#[tokio::test]
async fn test_airport_match_ignores_case() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["dropoff_address"] = json!("ROTTERDAM THE HAGUE AIRPORT");

    let (_, result) = post_quote(body).await;
    assert_eq!(items_of_kind(&result, "surcharges", "airport").len(), 1);
}

#[tokio::test]
async fn test_load_and_waiting_fees() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["passengers"] = json!(6);
    body["large_luggage"] = json!(2);
    body["small_luggage"] = json!(1);
    body["waiting_minutes"] = json!(5.2);

    let (status, result) = post_quote(body).await;
    assert_eq!(status, StatusCode::OK);

    assert_amount(
        items_of_kind(&result, "surcharges", "extra_passenger")[0],
        "/amount",
        "2.00",
    );
    assert_amount(
        items_of_kind(&result, "surcharges", "large_luggage")[0],
        "/amount",
        "3.00",
    );
    assert_amount(
        items_of_kind(&result, "surcharges", "small_luggage")[0],
        "/amount",
        "0.50",
    );
    // ceil(5.2) = 6 minutes, 3 free
    assert_amount(
        items_of_kind(&result, "surcharges", "waiting")[0],
        "/amount",
        "1.50",
    );
    assert_amount(&result, "/breakdown/surcharges/total", "7.00");
}

#[tokio::test]
async fn test_zero_counts_produce_no_items() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["pets"] = json!(0);
    body["large_luggage"] = json!(0);
    body["passengers"] = json!(4);

    let (_, result) = post_quote(body).await;
    assert!(items(&result, "surcharges").is_empty());
}

// =============================================================================
// Booking surcharges
// =============================================================================

#[tokio::test]
async fn test_reservation_paid_by_credit_card() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["reservation"] = json!(true);
    body["payment_method"] = json!("creditcard");

    let (status, result) = post_quote(body).await;
    assert_eq!(status, StatusCode::OK);

    let reservation = items_of_kind(&result, "surcharges", "reservation");
    assert_eq!(reservation.len(), 1);
    assert_amount(reservation[0], "/amount", "2.50");

    let payment = items_of_kind(&result, "surcharges", "payment_method");
    assert_eq!(payment.len(), 1);
    assert_amount(payment[0], "/amount", "1.50");

    // 42.50 + 2.50 + 1.50 = 46.50; VAT 9.77
    assert_amount(&result, "/breakdown/subtotal", "46.50");
    assert_amount(&result, "/breakdown/total_including_vat", "56.27");
}

#[tokio::test]
async fn test_cash_and_pin_add_no_payment_fee() {
    for method in ["cash", "pin"] {
        let mut body = create_trip("2026-01-14T14:00:00");
        body["payment_method"] = json!(method);

        let (status, result) = post_quote(body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(items(&result, "surcharges").is_empty(), "{} should be free", method);
    }
}

#[tokio::test]
async fn test_unknown_payment_method_is_rejected() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["payment_method"] = json!("bitcoin");

    let (status, error) = post_quote(body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MALFORMED_JSON");
}

// =============================================================================
// Discounts
// =============================================================================

#[tokio::test]
async fn test_promo_code_is_case_insensitive() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["promo_code"] = json!("welcome10");

    let (status, result) = post_quote(body).await;
    assert_eq!(status, StatusCode::OK);

    let promo = items_of_kind(&result, "discounts", "promo_code");
    assert_eq!(promo.len(), 1);
    assert_amount(promo[0], "/amount", "4.25");
    assert_amount(&result, "/breakdown/subtotal", "38.25");
}

#[tokio::test]
async fn test_combined_discounts_are_capped() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["round_trip"] = json!(true);
    body["frequent_rider"] = json!(true);
    body["promo_code"] = json!("HALFPRICE");

    let (status, result) = post_quote(body).await;
    assert_eq!(status, StatusCode::OK);

    // 0.10 + 0.05 + 0.50 is capped at 0.50 of 42.50
    assert_amount(&result, "/breakdown/discounts/total", "21.25");
    assert_amount(&result, "/breakdown/subtotal", "21.25");
    assert_amount(&result, "/breakdown/total_including_vat", "25.71");
    assert_eq!(result["payment"]["value"], "25.71");

    let sum: Decimal = items(&result, "discounts")
        .iter()
        .map(|item| Decimal::from_str(item["amount"].as_str().unwrap()).unwrap())
        .sum();
    assert_eq!(sum, Decimal::from_str("21.25").unwrap());
}

#[tokio::test]
async fn test_expired_promo_code_gives_no_discount() {
    let mut body = create_trip("2026-06-02T14:00:00");
    body["promo_code"] = json!("SPRING15");

    let (status, result) = post_quote(body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(items(&result, "discounts").is_empty());
    assert_amount(&result, "/breakdown/subtotal", "42.50");

    let step = result["breakdown"]["audit_trace"]
        .as_array()
        .unwrap()
        .iter()
        .find(|step| step["rule_id"] == "promo_code_discount")
        .unwrap();
    assert_eq!(step["output"]["rejection"], "expired");
}

#[tokio::test]
async fn test_promo_code_minimum_fare() {
    // 42.50 is below the 60.00 minimum
    let mut short = create_trip("2026-01-14T14:00:00");
    short["promo_code"] = json!("LONGRIDE20");
    let (_, result) = post_quote(short).await;
    assert!(items(&result, "discounts").is_empty());

    // 8.50 + 20 × 2.50 + 30 × 0.45 = 72.00; 20% = 14.40
    let long = json!({
        "distance_km": 20,
        "duration_minutes": 30,
        "pickup_time": "2026-01-14T14:00:00",
        "promo_code": "longride20"
    });
    let (status, result) = post_quote(long).await;
    assert_eq!(status, StatusCode::OK);
    assert_amount(&result, "/breakdown/discounts/total", "14.40");
    assert_amount(&result, "/breakdown/subtotal", "57.60");
}

// =============================================================================
// Envelope and audit trace
// =============================================================================

#[tokio::test]
async fn test_breakdown_is_deterministic_but_quote_ids_are_unique() {
    let mut body = create_trip("2026-01-14T23:30:00");
    body["dropoff_address"] = json!("Schiphol");
    body["promo_code"] = json!("SUMMER25");

    let (_, first) = post_quote(body.clone()).await;
    let (_, second) = post_quote(body).await;

    assert_eq!(first["breakdown"], second["breakdown"]);
    assert_ne!(first["quote_id"], second["quote_id"]);
    assert_eq!(first["tariff_code"], "standard");
    assert_eq!(first["engine_version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_audit_trace_records_every_rule() {
    let (_, result) = post_quote(create_trip("2026-01-14T14:00:00")).await;

    let trace = result["breakdown"]["audit_trace"].as_array().unwrap();
    let rule_ids: Vec<&str> = trace
        .iter()
        .map(|step| step["rule_id"].as_str().unwrap())
        .collect();
    assert_eq!(rule_ids.first(), Some(&"base_fare"));
    assert_eq!(rule_ids.last(), Some(&"totals"));
    assert!(rule_ids.contains(&"night_surcharge"));
    assert!(rule_ids.contains(&"discount_combination"));

    for (index, step) in trace.iter().enumerate() {
        assert_eq!(step["step_number"], json!(index + 1));
    }
}

// =============================================================================
// Promo code endpoint
// =============================================================================

#[tokio::test]
async fn test_validate_promo_code_endpoint() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/promo-codes/validate",
        json!({"code": " summer25 "}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["code"], "SUMMER25");
    assert_eq!(result["is_valid"], true);
    assert_amount(&result, "/discount_fraction", "0.25");
}

#[tokio::test]
async fn test_validate_unknown_promo_code_endpoint() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/promo-codes/validate",
        json!({"code": "UNKNOWN123"}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["is_valid"], false);
    assert_amount(&result, "/discount_fraction", "0");
    assert_eq!(result["rejection"], "unknown");
}

#[tokio::test]
async fn test_validate_promo_code_endpoint_checks_expiry_and_minimum() {
    let (_, expired) = post_json(
        create_router_for_test(),
        "/promo-codes/validate",
        json!({"code": "SPRING15", "pickup_time": "2026-07-01T10:00:00"}).to_string(),
    )
    .await;
    assert_eq!(expired["is_valid"], false);
    assert_eq!(expired["rejection"], "expired");

    let (_, in_time) = post_json(
        create_router_for_test(),
        "/promo-codes/validate",
        json!({"code": "SPRING15", "pickup_time": "2026-04-01T10:00:00"}).to_string(),
    )
    .await;
    assert_eq!(in_time["is_valid"], true);

    let (_, below) = post_json(
        create_router_for_test(),
        "/promo-codes/validate",
        json!({"code": "LONGRIDE20", "amount": "59.99"}).to_string(),
    )
    .await;
    assert_eq!(below["is_valid"], false);
    assert_eq!(below["rejection"], "below_minimum");
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let (status, error) =
        post_json(create_router_for_test(), "/quote", "{invalid json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_field_returns_validation_error() {
    let body = json!({"distance_km": 10, "pickup_time": "2026-01-14T14:00:00"});

    let (status, error) = post_quote(body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(error["message"].as_str().unwrap().contains("duration_minutes"));
}

#[tokio::test]
async fn test_wrong_type_returns_malformed_json() {
    let body = json!({
        "distance_km": "ten",
        "duration_minutes": 20,
        "pickup_time": "2026-01-14T14:00:00"
    });

    let (status, error) = post_quote(body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_negative_count_returns_invalid_input() {
    let mut body = create_trip("2026-01-14T14:00:00");
    body["large_luggage"] = json!(-1);

    let (status, error) = post_quote(body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_INPUT");
    assert!(error["message"].as_str().unwrap().contains("large_luggage_count"));
}

#[tokio::test]
async fn test_missing_content_type_returns_400() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/quote")
                .body(Body::from(create_trip("2026-01-14T14:00:00").to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
