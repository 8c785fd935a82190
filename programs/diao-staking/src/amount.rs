//! Conversion between user-entered decimal strings and raw token base units.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("not a number: {0:?}")]
    NotNumeric(String),

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("more than {max} decimal places")]
    TooManyDecimals { max: u32 },

    #[error("amount too large")]
    Overflow,
}

/// Parse a decimal string such as `"1.5"` into base units at `decimals`.
///
/// Only plain decimal notation is accepted: digits with at most one `.`.
/// Zero and negative values are rejected as `NotPositive`.
pub fn parse_units(input: &str, decimals: u32) -> Result<u128, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    if let Some(rest) = trimmed.strip_prefix('-') {
        // A well-formed negative number is a sign problem, not a syntax one
        return match split_decimal(rest) {
            Some(_) => Err(AmountError::NotPositive),
            None => Err(AmountError::NotNumeric(trimmed.to_string())),
        };
    }

    let (whole, fraction) =
        split_decimal(trimmed).ok_or_else(|| AmountError::NotNumeric(trimmed.to_string()))?;

    if fraction.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals { max: decimals });
    }

    let scale = 10u128.checked_pow(decimals).ok_or(AmountError::Overflow)?;

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| AmountError::Overflow)?
    };

    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded.parse::<u128>().map_err(|_| AmountError::Overflow)?
    };

    let value = whole_units
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_units))
        .ok_or(AmountError::Overflow)?;

    if value == 0 {
        return Err(AmountError::NotPositive);
    }

    Ok(value)
}

/// Split `"12.34"` into `("12", "34")`; `None` unless every char is a digit
/// and at least one digit is present.
fn split_decimal(s: &str) -> Option<(&str, &str)> {
    let (whole, fraction) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return None;
    }
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    Some((whole, fraction))
}

/// Render base units with `precision` fractional digits, rounding half up.
///
/// `format_units(1_500_000_000_000_000_000, 18, 6) == "1.500000"`
pub fn format_units(raw: u128, decimals: u32, precision: usize) -> String {
    let precision_u32 = precision as u32;

    let scaled = if precision_u32 >= decimals {
        // Widening the fraction: exact, just pad below
        raw
    } else {
        let divisor = 10u128.pow(decimals - precision_u32);
        let quotient = raw / divisor;
        let remainder = raw % divisor;
        if remainder >= divisor - remainder {
            quotient.saturating_add(1)
        } else {
            quotient
        }
    };

    let shown = precision_u32.min(decimals);
    let unit = 10u128.pow(shown);
    let whole = scaled / unit;
    let fraction = scaled % unit;

    if precision == 0 {
        return whole.to_string();
    }

    let mut digits = format!("{:0width$}", fraction, width = shown as usize);
    while digits.len() < precision {
        digits.push('0');
    }
    format!("{whole}.{digits}")
}
