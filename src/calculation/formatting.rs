//! Display formatting for amounts shown in the booking form.

use rust_decimal::Decimal;

use super::round_currency;

/// Formats an amount the Dutch way: euro sign, dot thousands separator,
/// comma decimal separator.
///
/// # Examples
///
/// ```
/// use fare_engine::calculation::format_price;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(format_price(Decimal::from_str("14.52").unwrap()), "€ 14,52");
/// assert_eq!(format_price(Decimal::from_str("1234.5").unwrap()), "€ 1.234,50");
/// ```
pub fn format_price(amount: Decimal) -> String {
    let mut rounded = round_currency(amount);
    rounded.rescale(2);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{}€ {},{}", if negative { "-" } else { "" }, grouped, cents)
}
