//! Time window detection for night and weekend surcharges.
//!
//! Windows are half-open: the start is inside, the end is outside. A window
//! whose end precedes its start wraps around midnight (for hours) or around
//! the end of the week (for weekly windows).

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Returns true if `hour` falls in the daily window `[start, end)`.
///
/// - `start < end`: `[start, end)`, e.g. 0→6.
/// - `start > end`: `[start, 24) ∪ [0, end)`, e.g. 23→6.
/// - `start == end`: the window is empty.
///
/// # Examples
///
/// ```
/// use fare_engine::calculation::is_hour_in_window;
///
/// assert!(is_hour_in_window(23, 23, 6));
/// assert!(is_hour_in_window(0, 23, 6));
/// assert!(is_hour_in_window(5, 23, 6));
/// assert!(!is_hour_in_window(6, 23, 6));
/// assert!(!is_hour_in_window(14, 23, 6));
/// ```
pub fn is_hour_in_window(hour: u32, start: u32, end: u32) -> bool {
    if start < end {
        hour >= start && hour < end
    } else if start > end {
        hour >= start || hour < end
    } else {
        false
    }
}

/// Minutes elapsed since Monday 00:00 of the same week.
pub fn minute_of_week(datetime: NaiveDateTime) -> u32 {
    datetime.weekday().num_days_from_monday() * MINUTES_PER_DAY
        + datetime.hour() * 60
        + datetime.minute()
}

/// Returns true if `datetime` falls in the weekly window that opens on
/// `start_day` at `start_hour` and closes on `end_day` at `end_hour`.
///
/// # Examples
///
/// ```
/// use fare_engine::calculation::is_in_weekly_window;
/// use chrono::{NaiveDateTime, Weekday};
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
///
/// // 2026-01-16 is a Friday, 2026-01-19 a Monday.
/// assert!(is_in_weekly_window(at("2026-01-16 18:00:00"), Weekday::Fri, 18, Weekday::Mon, 6));
/// assert!(is_in_weekly_window(at("2026-01-19 05:59:00"), Weekday::Fri, 18, Weekday::Mon, 6));
/// assert!(!is_in_weekly_window(at("2026-01-19 06:00:00"), Weekday::Fri, 18, Weekday::Mon, 6));
/// ```
pub fn is_in_weekly_window(
    datetime: NaiveDateTime,
    start_day: Weekday,
    start_hour: u32,
    end_day: Weekday,
    end_hour: u32,
) -> bool {
    let now = minute_of_week(datetime);
    let start = start_day.num_days_from_monday() * MINUTES_PER_DAY + start_hour * 60;
    let end = end_day.num_days_from_monday() * MINUTES_PER_DAY + end_hour * 60;

    if start < end {
        now >= start && now < end
    } else if start > end {
        now >= start || now < end
    } else {
        false
    }
}
