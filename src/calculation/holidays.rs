//! Holiday calendar.
//!
//! Fixed-date holidays come straight from configuration. Movable holidays
//! are offsets from Easter Sunday, computed with the anonymous Gregorian
//! algorithm (Meeus/Jones/Butcher).

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::config::{HolidaySurcharge, MonthDay, MovableHoliday};

/// Why a date counts as a holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum HolidayMatch {
    /// Listed under `fixed_dates`.
    Fixed {
        /// The matching entry.
        date: MonthDay,
    },
    /// Listed under `lustrum_dates` and the year is divisible by 5.
    Lustrum {
        /// The matching entry.
        date: MonthDay,
    },
    /// An Easter-based holiday.
    Movable {
        /// Which holiday.
        holiday: MovableHoliday,
    },
}

/// Computes Easter Sunday for a Gregorian year.
///
/// Returns `None` only for years chrono cannot represent.
///
/// # Examples
///
/// ```
/// use fare_engine::calculation::easter_sunday;
/// use chrono::NaiveDate;
///
/// assert_eq!(easter_sunday(2024), NaiveDate::from_ymd_opt(2024, 3, 31));
/// assert_eq!(easter_sunday(2026), NaiveDate::from_ymd_opt(2026, 4, 5));
/// ```
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let n = h + l - 7 * m + 114;

    NaiveDate::from_ymd_opt(year, (n / 31) as u32, (n % 31 + 1) as u32)
}

/// The date of a movable holiday in the given year.
pub fn movable_holiday_date(year: i32, holiday: MovableHoliday) -> Option<NaiveDate> {
    easter_sunday(year).map(|easter| easter + Duration::days(holiday.offset_days()))
}

/// Checks whether `date` is a holiday under `rule`.
///
/// Fixed dates are checked first, then lustrum dates, then movable holidays.
pub fn find_holiday(date: NaiveDate, rule: &HolidaySurcharge) -> Option<HolidayMatch> {
    if let Some(fixed) = rule.fixed_dates.iter().find(|md| md.matches(date)) {
        return Some(HolidayMatch::Fixed { date: *fixed });
    }

    if date.year() % 5 == 0 {
        if let Some(lustrum) = rule.lustrum_dates.iter().find(|md| md.matches(date)) {
            return Some(HolidayMatch::Lustrum { date: *lustrum });
        }
    }

    rule.movable
        .iter()
        .find(|holiday| movable_holiday_date(date.year(), **holiday) == Some(date))
        .map(|holiday| HolidayMatch::Movable { holiday: *holiday })
}

/// Lists every holiday of `year` under `rule`, sorted and deduplicated.
///
/// Useful for showing upcoming surcharge days in the booking form.
pub fn holidays_in_year(year: i32, rule: &HolidaySurcharge) -> Vec<NaiveDate> {
    let from_month_day = |md: &MonthDay| NaiveDate::from_ymd_opt(year, md.month, md.day);

    let mut dates: Vec<NaiveDate> = rule.fixed_dates.iter().filter_map(from_month_day).collect();
    if year % 5 == 0 {
        dates.extend(rule.lustrum_dates.iter().filter_map(from_month_day));
    }
    dates.extend(
        rule.movable
            .iter()
            .filter_map(|holiday| movable_holiday_date(year, *holiday)),
    );

    dates.sort();
    dates.dedup();
    dates
}
