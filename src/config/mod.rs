//! Configuration loading and management for the fare engine.
//!
//! This module loads a tariff's rate table from YAML files: base rates,
//! surcharge rules, discount fractions and VAT.
//!
//! # Example
//!
//! ```no_run
//! use fare_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/standard").unwrap();
//! println!("Loaded tariff: {}", config.tariff().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AirportSurcharge, BaseRates, DiscountRates, DiscountsFile, HolidaySurcharge, MonthDay,
    MovableHoliday, NightSurcharge, PaymentMethodFees, PerUnitFees, PromoCode, RateTable,
    ReservationSurcharge, SurchargeAmount, SurchargesFile, TariffFile, TariffMetadata,
    WeekendSurcharge,
};
