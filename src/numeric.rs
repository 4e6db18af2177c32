//! Numeric input handling shared by the calculation engine.
//!
//! Operators type dimensions and prices with either `,` or `.` as the
//! decimal separator, and often paste values with stray characters. Parsing
//! here never fails: anything unusable collapses to the caller's default.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Normalizes free-form numeric text.
///
/// Every `,` becomes `.`, every character that is not a digit or `.` is
/// dropped, and only the first `.` is kept.
pub fn normalize_number_input(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut seen_point = false;

    for ch in input.chars() {
        match ch {
            '0'..='9' => out.push(ch),
            '.' | ',' if !seen_point => {
                out.push('.');
                seen_point = true;
            }
            _ => {}
        }
    }

    out
}

/// Parses free-form numeric text into a [`Decimal`], falling back to
/// `default` for empty or unusable input.
///
/// ```
/// use door_orders::numeric::parse_number;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_number("12,5abc", Decimal::ZERO).to_string(), "12.5");
/// assert_eq!(parse_number("", Decimal::ONE), Decimal::ONE);
/// ```
pub fn parse_number(input: &str, default: Decimal) -> Decimal {
    let normalized = normalize_number_input(input);
    let trimmed = normalized.trim_end_matches('.');
    if trimmed.is_empty() {
        return default;
    }

    let candidate = if trimmed.starts_with('.') {
        format!("0{trimmed}")
    } else {
        trimmed.to_string()
    };

    match Decimal::from_str(&candidate) {
        Ok(value) => value.normalize(),
        Err(e) => {
            tracing::debug!(input, error = %e, "numeric input rejected, using default");
            default
        }
    }
}

/// Parses a whole quantity, truncating any fractional part.
pub fn parse_quantity(input: &str, default: u32) -> u32 {
    parse_number(input, Decimal::from(default))
        .trunc()
        .to_u32()
        .unwrap_or(default)
}

/// `a + b`, or zero when the sum does not fit.
pub fn total_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::ZERO)
}

/// `a - b`, or zero when the difference does not fit.
pub fn total_sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b).unwrap_or(Decimal::ZERO)
}

/// `a * b`, or zero when the product does not fit.
pub fn total_mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or(Decimal::ZERO)
}

/// `a / b`, or zero for a zero divisor or an overflow.
pub fn total_div(a: Decimal, b: Decimal) -> Decimal {
    a.checked_div(b).unwrap_or(Decimal::ZERO)
}

/// Rounds money to two places, midpoint away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed-point money string as the backend expects it (`"428000.00"`).
pub fn money_string(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

/// Percentage for display, two places.
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", round_money(value))
}

/// Money with thousands separators and a trailing currency symbol.
pub fn format_money(value: Decimal, currency_symbol: &str) -> String {
    let fixed = money_string(value);
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let negative = whole.starts_with('-');
    let digits = whole.trim_start_matches('-');

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if currency_symbol.is_empty() {
        format!("{sign}{grouped}.{frac}")
    } else {
        format!("{sign}{grouped}.{frac} {currency_symbol}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn comma_is_a_decimal_separator() {
        assert_eq!(parse_number("12,5", Decimal::ZERO), dec!(12.5));
    }

    #[test]
    fn stray_characters_are_dropped() {
        assert_eq!(parse_number("12,5abc", Decimal::ZERO), dec!(12.5));
        assert_eq!(parse_number(" 80 cm", Decimal::ZERO), dec!(80));
    }

    #[test]
    fn only_the_first_separator_survives() {
        assert_eq!(normalize_number_input("1.234,56"), "1.23456");
        assert_eq!(parse_number("1.2.3", Decimal::ZERO), dec!(1.23));
    }

    #[test]
    fn empty_input_yields_default() {
        assert_eq!(parse_number("", Decimal::ZERO), Decimal::ZERO);
        assert_eq!(parse_number("abc", dec!(7)), dec!(7));
        assert_eq!(parse_number(".", dec!(3)), dec!(3));
    }

    #[test]
    fn leading_and_trailing_separators() {
        assert_eq!(parse_number(",5", Decimal::ZERO), dec!(0.5));
        assert_eq!(parse_number("200,", Decimal::ZERO), dec!(200));
    }

    #[test]
    fn minus_sign_is_not_a_digit() {
        assert_eq!(parse_number("-15", Decimal::ZERO), dec!(15));
    }

    #[test]
    fn overlong_input_falls_back() {
        let huge = "9".repeat(40);
        assert_eq!(parse_number(&huge, dec!(1)), dec!(1));
    }

    #[test]
    fn quantity_truncates() {
        assert_eq!(parse_quantity("2,7", 1), 2);
        assert_eq!(parse_quantity("", 1), 1);
    }

    #[test]
    fn money_rounds_half_up() {
        assert_eq!(money_string(dec!(352800)), "352800.00");
        assert_eq!(money_string(dec!(0.005)), "0.01");
        assert_eq!(money_string(dec!(-0.005)), "-0.01");
    }

    #[test]
    fn money_is_grouped() {
        assert_eq!(format_money(dec!(3528000), "UZS"), "3,528,000.00 UZS");
        assert_eq!(format_money(dec!(-1234.5), ""), "-1,234.50");
        assert_eq!(format_money(dec!(999), ""), "999.00");
    }

    #[test]
    fn arithmetic_is_total() {
        assert_eq!(total_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(total_mul(Decimal::MAX, dec!(2)), Decimal::ZERO);
        assert_eq!(total_add(dec!(1.5), dec!(2)), dec!(3.5));
        assert_eq!(total_sub(dec!(1), dec!(2)), dec!(-1));
    }

    #[test]
    fn percent_display() {
        assert_eq!(format_percent(dec!(12.13151927)), "12.13%");
    }
}
