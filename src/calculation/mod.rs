//! Calculation logic for the fare engine.
//!
//! This module contains every pricing step: the distance/time base fare with
//! minimum and maximum clamping, the night, weekend, holiday and airport
//! surcharges, per-unit fees for pets, luggage, passengers and waiting time,
//! reservation and payment method fees, discount combination under a cap, VAT, and the Dutch display format used
//! by the booking form.

mod airport_surcharge;
mod base_fare;
mod booking_surcharges;
mod discounts;
mod fare;
mod formatting;
mod holiday_surcharge;
mod holidays;
mod night_surcharge;
mod promo_code;
mod rounding;
mod surcharges;
mod time_windows;
mod unit_surcharges;
mod weekend_surcharge;

pub use airport_surcharge::{calculate_airport_surcharge, match_airport};
pub use base_fare::{BaseFareResult, FareClamp, calculate_base_fare, compute_base_fare};
pub use booking_surcharges::{calculate_payment_method_surcharge, calculate_reservation_surcharge};
pub use discounts::{
    DiscountCombination, DiscountEvaluation, FiredDiscount, combine_discounts, evaluate_discounts,
};
pub use fare::calculate_fare;
pub use formatting::format_price;
pub use holiday_surcharge::calculate_holiday_surcharge;
pub use holidays::{HolidayMatch, easter_sunday, find_holiday, holidays_in_year, movable_holiday_date};
pub use night_surcharge::calculate_night_surcharge;
pub use promo_code::{
    PromoCodeRejection, PromoCodeValidation, check_promo_code, lookup_promo_code,
    normalize_promo_code, validate_promo_code,
};
pub use rounding::{CURRENCY_DECIMAL_PLACES, round_currency};
pub use surcharges::{SurchargeEvaluation, evaluate_surcharges};
pub use time_windows::{is_hour_in_window, is_in_weekly_window, minute_of_week};
pub use unit_surcharges::{calculate_count_surcharge, calculate_waiting_surcharge};
pub use weekend_surcharge::calculate_weekend_surcharge;
