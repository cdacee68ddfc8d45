//! Fare Calculation Engine for Taxi Bookings
//!
//! This crate turns a trip (distance, duration, pickup time, passengers and
//! extras) and a tariff's rate table into a deterministic price breakdown:
//! base fare, itemized surcharges and discounts, VAT and an audit trace of
//! every rule evaluated. An axum API exposes the engine to the booking form.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
