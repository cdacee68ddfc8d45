//! HTTP API module for the fare engine.
//!
//! This module provides the REST API endpoints the booking form uses to
//! price a trip and to check a promo code.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{PromoCodeRequest, QuoteRequest};
pub use response::{ApiError, ApiErrorResponse, QuoteResponse};
pub use state::AppState;
