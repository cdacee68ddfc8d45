//! Configuration types for fare calculation.
//!
//! This module contains the strongly-typed rate table structures that
//! are deserialized from YAML configuration files.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::models::PaymentMethod;

/// Metadata about the tariff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffMetadata {
    /// Short identifier of the tariff (e.g., "standard").
    pub code: String,
    /// The human-readable name of the tariff.
    pub name: String,
    /// The version or effective date of the tariff.
    pub version: String,
}

/// Distance/time rates that make up the base fare.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseRates {
    /// Flag-fall charged on every trip.
    pub start_fare: Decimal,
    /// Price per kilometre.
    pub per_km: Decimal,
    /// Price per minute of driving time.
    pub per_minute: Decimal,
    /// Lower bound for the base fare.
    pub min_fare: Decimal,
    /// Upper bound for the base fare.
    pub max_fare: Decimal,
}

/// How a time-based surcharge is priced.
///
/// ```
/// use fare_engine::config::SurchargeAmount;
/// use rust_decimal::Decimal;
///
/// let flat: SurchargeAmount = serde_yaml::from_str("mode: flat\namount: \"2.50\"").unwrap();
/// assert_eq!(flat.apply(Decimal::new(4250, 2)), Decimal::new(250, 2));
///
/// let pct: SurchargeAmount = serde_yaml::from_str("mode: multiplier\nmultiplier: \"1.2\"").unwrap();
/// assert_eq!(pct.apply(Decimal::new(4250, 2)), Decimal::new(850, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SurchargeAmount {
    /// A fixed amount added to the fare.
    Flat {
        /// The amount in the tariff currency.
        amount: Decimal,
    },
    /// A percentage of the base fare, expressed as a multiplier (1.2 = +20%).
    Multiplier {
        /// The multiplier applied to the base fare.
        multiplier: Decimal,
    },
}

impl SurchargeAmount {
    /// Returns the unrounded surcharge for the given base fare.
    pub fn apply(&self, base_fare: Decimal) -> Decimal {
        match self {
            SurchargeAmount::Flat { amount } => *amount,
            SurchargeAmount::Multiplier { multiplier } => base_fare * (*multiplier - Decimal::ONE),
        }
    }

    fn validate(&self, field: &str) -> EngineResult<()> {
        match self {
            SurchargeAmount::Flat { amount } => non_negative(field, *amount),
            SurchargeAmount::Multiplier { multiplier } => {
                if *multiplier < Decimal::ONE {
                    Err(EngineError::invalid_config(
                        field,
                        format!("multiplier {} is below 1", multiplier),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Night surcharge window, in whole hours of the local clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightSurcharge {
    /// First hour of the window (inclusive).
    pub start_hour: u32,
    /// Hour the window ends (exclusive); may be smaller than `start_hour`.
    pub end_hour: u32,
    /// How the surcharge is priced.
    pub amount: SurchargeAmount,
}

/// Weekend surcharge window within a Monday-based week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekendSurcharge {
    /// Day the window opens.
    pub start_day: Weekday,
    /// Hour on `start_day` the window opens.
    pub start_hour: u32,
    /// Day the window closes.
    pub end_day: Weekday,
    /// Hour on `end_day` the window closes (exclusive).
    pub end_hour: u32,
    /// How the surcharge is priced.
    pub amount: SurchargeAmount,
}

/// A calendar day without a year, written as `MM-DD` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    /// Month of the year (1-12).
    pub month: u32,
    /// Day of the month (1-31).
    pub day: u32,
}

impl MonthDay {
    /// Returns true if `date` falls on this month and day.
    pub fn matches(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.day() == self.day
    }
}

impl TryFrom<String> for MonthDay {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (month, day) = value
            .split_once('-')
            .ok_or_else(|| format!("expected MM-DD, got '{}'", value))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{}'", value))?;
        let day: u32 = day
            .parse()
            .map_err(|_| format!("invalid day in '{}'", value))?;

        // 2000 is a leap year, so 02-29 is accepted.
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(format!("'{}' is not a calendar day", value));
        }

        Ok(MonthDay { month, day })
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        format!("{:02}-{:02}", value.month, value.day)
    }
}

/// Holidays whose date follows Easter Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovableHoliday {
    /// Two days before Easter Sunday.
    GoodFriday,
    /// The day after Easter Sunday.
    EasterMonday,
    /// 39 days after Easter Sunday.
    AscensionDay,
    /// 49 days after Easter Sunday.
    WhitSunday,
    /// 50 days after Easter Sunday.
    WhitMonday,
}

impl MovableHoliday {
    /// Offset in days from Easter Sunday.
    pub fn offset_days(&self) -> i64 {
        match self {
            MovableHoliday::GoodFriday => -2,
            MovableHoliday::EasterMonday => 1,
            MovableHoliday::AscensionDay => 39,
            MovableHoliday::WhitSunday => 49,
            MovableHoliday::WhitMonday => 50,
        }
    }
}

/// Holiday surcharge rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidaySurcharge {
    /// Holidays on the same date every year.
    #[serde(default)]
    pub fixed_dates: Vec<MonthDay>,
    /// Holidays that only count in years divisible by 5 (e.g. Liberation Day).
    #[serde(default)]
    pub lustrum_dates: Vec<MonthDay>,
    /// Easter-based holidays.
    #[serde(default)]
    pub movable: Vec<MovableHoliday>,
    /// How the surcharge is priced.
    pub amount: SurchargeAmount,
}

/// Airport pickup/dropoff surcharge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportSurcharge {
    /// Location name fragments that identify an airport.
    pub locations: Vec<String>,
    /// Flat fee charged once per trip.
    pub fee: Decimal,
}

fn default_free_passengers() -> u32 {
    4
}

fn default_free_waiting_minutes() -> u32 {
    3
}

/// Per-unit fees for load and waiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerUnitFees {
    /// Fee per pet.
    pub pet: Decimal,
    /// Fee per large piece of luggage.
    pub large_luggage: Decimal,
    /// Fee per small piece of luggage.
    pub small_luggage: Decimal,
    /// Fee per passenger above `free_passengers`.
    pub extra_passenger: Decimal,
    /// Fee per billed waiting minute above `free_waiting_minutes`.
    pub waiting_per_minute: Decimal,
    /// Passengers carried without an extra fee.
    #[serde(default = "default_free_passengers")]
    pub free_passengers: u32,
    /// Waiting minutes that are not billed.
    #[serde(default = "default_free_waiting_minutes")]
    pub free_waiting_minutes: u32,
}

/// Flat fee for booking a trip in advance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationSurcharge {
    /// Fee charged once per reserved trip.
    pub fee: Decimal,
}

/// Fee per payment method. Methods left out of the configuration are free.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentMethodFees {
    /// Paying the driver in cash.
    #[serde(default)]
    pub cash: Decimal,
    /// Debit card at the terminal.
    #[serde(default)]
    pub pin: Decimal,
    /// Credit card.
    #[serde(default)]
    pub credit_card: Decimal,
}

impl PaymentMethodFees {
    /// Returns the fee for `method`.
    pub fn fee(&self, method: PaymentMethod) -> Decimal {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Pin => self.pin,
            PaymentMethod::CreditCard => self.credit_card,
        }
    }
}

/// A configured promo code.
///
/// ```
/// use fare_engine::config::PromoCode;
/// use rust_decimal::Decimal;
///
/// let promo: PromoCode = serde_yaml::from_str("fraction: \"0.25\"\nvalid_until: 2026-08-31").unwrap();
/// assert_eq!(promo.fraction, Decimal::new(25, 2));
/// assert!(promo.min_amount.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    /// Fraction off the gross fare.
    pub fraction: Decimal,
    /// Last pickup date the code is accepted on (inclusive).
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// Smallest gross fare the code is accepted on.
    #[serde(default)]
    pub min_amount: Option<Decimal>,
}

/// Discount fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRates {
    /// Fraction off for round trips.
    pub round_trip: Decimal,
    /// Fraction off for frequent riders.
    pub frequent_rider: Decimal,
    /// Promo codes by code. Keys are uppercase once loaded.
    #[serde(default)]
    pub promo_codes: BTreeMap<String, PromoCode>,
}

/// Shape of `tariff.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TariffFile {
    /// Tariff metadata.
    pub tariff: TariffMetadata,
    /// Base fare rates.
    pub base_rates: BaseRates,
    /// VAT fraction.
    pub vat_rate: Decimal,
    /// Upper bound on the sum of discount fractions.
    pub max_combined_discount_fraction: Decimal,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// Shape of `surcharges.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SurchargesFile {
    /// Night rule.
    pub night: NightSurcharge,
    /// Weekend rule.
    pub weekend: WeekendSurcharge,
    /// Holiday rule.
    pub holiday: HolidaySurcharge,
    /// Airport rule.
    pub airport: AirportSurcharge,
    /// Per-unit fees.
    pub per_unit_fees: PerUnitFees,
    /// Advance booking fee; free when absent.
    #[serde(default)]
    pub reservation: ReservationSurcharge,
    /// Payment method fees; all free when absent.
    #[serde(default)]
    pub payment_method: PaymentMethodFees,
}

/// Shape of `discounts.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscountsFile {
    /// Discount fractions.
    pub discount_rates: DiscountRates,
}

/// The complete, validated rate table.
///
/// Loaded once and then only read. Pass it by reference to the calculation
/// functions; it holds no interior mutability and is safe to share across
/// threads.
#[derive(Debug, Clone, Serialize)]
pub struct RateTable {
    /// Tariff metadata.
    pub metadata: TariffMetadata,
    /// Base fare rates.
    pub base: BaseRates,
    /// Night surcharge.
    pub night: NightSurcharge,
    /// Weekend surcharge.
    pub weekend: WeekendSurcharge,
    /// Holiday surcharge.
    pub holiday: HolidaySurcharge,
    /// Airport surcharge.
    pub airport: AirportSurcharge,
    /// Per-unit fees.
    pub per_unit_fees: PerUnitFees,
    /// Advance booking fee.
    pub reservation: ReservationSurcharge,
    /// Payment method fees.
    pub payment_method: PaymentMethodFees,
    /// Discount fractions.
    pub discount_rates: DiscountRates,
    /// VAT fraction (0.21 = 21%).
    pub vat_rate: Decimal,
    /// Upper bound on the sum of discount fractions.
    pub max_combined_discount_fraction: Decimal,
    /// ISO currency code.
    pub currency: String,
}

impl RateTable {
    /// Assembles a rate table from its configuration files and validates it.
    ///
    /// Promo code keys are normalized to trimmed uppercase.
    pub fn from_parts(
        tariff: TariffFile,
        surcharges: SurchargesFile,
        discounts: DiscountsFile,
    ) -> EngineResult<Self> {
        let mut discount_rates = discounts.discount_rates;
        discount_rates.promo_codes = discount_rates
            .promo_codes
            .into_iter()
            .map(|(code, promo)| (code.trim().to_uppercase(), promo))
            .collect();

        let table = Self {
            metadata: tariff.tariff,
            base: tariff.base_rates,
            night: surcharges.night,
            weekend: surcharges.weekend,
            holiday: surcharges.holiday,
            airport: surcharges.airport,
            per_unit_fees: surcharges.per_unit_fees,
            reservation: surcharges.reservation,
            payment_method: surcharges.payment_method,
            discount_rates,
            vat_rate: tariff.vat_rate,
            max_combined_discount_fraction: tariff.max_combined_discount_fraction,
            currency: tariff.currency,
        };
        table.validate()?;
        Ok(table)
    }

    /// Checks the rate table invariants.
    pub fn validate(&self) -> EngineResult<()> {
        let base = &self.base;
        non_negative("start_fare", base.start_fare)?;
        non_negative("per_km", base.per_km)?;
        non_negative("per_minute", base.per_minute)?;
        non_negative("min_fare", base.min_fare)?;
        non_negative("max_fare", base.max_fare)?;
        if base.min_fare > base.max_fare {
            return Err(EngineError::invalid_config(
                "min_fare",
                format!("{} exceeds max_fare {}", base.min_fare, base.max_fare),
            ));
        }

        hour("night.start_hour", self.night.start_hour)?;
        hour("night.end_hour", self.night.end_hour)?;
        self.night.amount.validate("night.amount")?;

        hour("weekend.start_hour", self.weekend.start_hour)?;
        hour("weekend.end_hour", self.weekend.end_hour)?;
        self.weekend.amount.validate("weekend.amount")?;

        self.holiday.amount.validate("holiday.amount")?;
        non_negative("airport.fee", self.airport.fee)?;

        let fees = &self.per_unit_fees;
        non_negative("per_unit_fees.pet", fees.pet)?;
        non_negative("per_unit_fees.large_luggage", fees.large_luggage)?;
        non_negative("per_unit_fees.small_luggage", fees.small_luggage)?;
        non_negative("per_unit_fees.extra_passenger", fees.extra_passenger)?;
        non_negative("per_unit_fees.waiting_per_minute", fees.waiting_per_minute)?;

        non_negative("reservation.fee", self.reservation.fee)?;
        non_negative("payment_method.cash", self.payment_method.cash)?;
        non_negative("payment_method.pin", self.payment_method.pin)?;
        non_negative("payment_method.credit_card", self.payment_method.credit_card)?;

        fraction("discount_rates.round_trip", self.discount_rates.round_trip)?;
        fraction(
            "discount_rates.frequent_rider",
            self.discount_rates.frequent_rider,
        )?;
        for (code, promo) in &self.discount_rates.promo_codes {
            let field = format!("discount_rates.promo_codes.{}", code);
            fraction(&field, promo.fraction)?;
            if let Some(min_amount) = promo.min_amount {
                non_negative(&format!("{}.min_amount", field), min_amount)?;
            }
        }

        non_negative("vat_rate", self.vat_rate)?;
        fraction(
            "max_combined_discount_fraction",
            self.max_combined_discount_fraction,
        )?;

        Ok(())
    }
}

fn non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(EngineError::invalid_config(
            field,
            format!("{} is negative", value),
        ));
    }
    Ok(())
}

fn fraction(field: &str, value: Decimal) -> EngineResult<()> {
    non_negative(field, value)?;
    if value > Decimal::ONE {
        return Err(EngineError::invalid_config(
            field,
            format!("{} is above 1", value),
        ));
    }
    Ok(())
}

fn hour(field: &str, value: u32) -> EngineResult<()> {
    if value > 23 {
        return Err(EngineError::invalid_config(
            field,
            format!("{} is not an hour of the day", value),
        ));
    }
    Ok(())
}
