//! Core data models for the fare engine.
//!
//! This module contains the trip input and the price breakdown output.

mod price_breakdown;
mod trip_request;

pub use price_breakdown::{
    AdjustmentSummary, AuditStep, LineItem, LineItemKind, PaymentAmount, PriceBreakdown,
    RuleOutcome,
};
pub use trip_request::{PaymentMethod, TripRequest};
pub(crate) use trip_request::validate_measure;
