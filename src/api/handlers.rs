//! HTTP request handlers for the fare engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{Local, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{calculate_fare, check_promo_code, format_price};
use crate::models::TripRequest;

use super::request::{PromoCodeRequest, QuoteRequest};
use super::response::{ApiError, ApiErrorResponse, QuoteResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/quote", post(quote_handler))
        .route("/promo-codes/validate", post(validate_promo_code_handler))
        .with_state(state)
}

/// Handler for POST /quote endpoint.
///
/// Accepts a trip and returns the priced quote.
async fn quote_handler(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing quote request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let trip: TripRequest = request.into();
    let rates = state.rates();

    let start_time = Instant::now();
    match calculate_fare(&trip, rates) {
        Ok(breakdown) => {
            let duration_us = start_time.elapsed().as_micros() as u64;
            info!(
                correlation_id = %correlation_id,
                distance_km = trip.distance_km,
                surcharges = breakdown.surcharges.items.len(),
                discounts = breakdown.discounts.items.len(),
                total = %breakdown.total_including_vat,
                duration_us = duration_us,
                "Quote calculated successfully"
            );

            let response = QuoteResponse {
                quote_id: Uuid::new_v4(),
                generated_at: Utc::now(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                tariff_code: rates.metadata.code.clone(),
                payment: breakdown.payment_amount(),
                formatted_total: format_price(breakdown.total),
                formatted_total_including_vat: format_price(breakdown.total_including_vat),
                breakdown,
                duration_us,
            };
            json_response(StatusCode::OK, response)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Quote calculation failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for POST /promo-codes/validate endpoint.
///
/// Rejected codes are a normal answer (`is_valid: false`), not an error.
/// Expiry is checked against `pickup_time`, or the current local time when
/// none is given; the minimum fare only when `amount` is given.
async fn validate_promo_code_handler(
    State(state): State<AppState>,
    payload: Result<Json<PromoCodeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let pickup_time = request
        .pickup_time
        .unwrap_or_else(|| Local::now().naive_local());
    let validation = check_promo_code(&request.code, pickup_time, request.amount, state.rates());
    info!(
        correlation_id = %correlation_id,
        code = %validation.code,
        is_valid = validation.is_valid,
        rejection = ?validation.rejection,
        "Promo code checked"
    );
    json_response(StatusCode::OK, validation)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Maps a body extraction failure to a 400 response.
fn rejection_response(rejection: JsonRejection, correlation_id: Uuid) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error).into_response()
}
