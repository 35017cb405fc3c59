//! Culture-invariant number parsing
//!
//! Invariant rules: `.` is the decimal point, `,` the group separator, `-`
//! and `+` the signs. Which elements may appear is controlled by
//! [`NumberStyles`]; anything else makes the input invalid.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::styles::NumberStyles;

/// Why a value could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing but white space
    #[error("A value is required.")]
    Empty,

    /// Not a number under the permitted styles
    #[error("The value '{0}' is not valid.")]
    Invalid(String),

    /// A number outside the range of the target type
    #[error("The value '{0}' is out of range.")]
    Overflow(String),
}

/// White space as the invariant culture defines it
fn is_white(c: char) -> bool {
    matches!(c, '\u{0009}'..='\u{000D}' | ' ')
}

/// A number reduced to `[-]digits.digits[e[-]digits]`
#[derive(Debug, PartialEq, Eq)]
struct Canonical {
    text: String,
    has_exponent: bool,
}

enum Body<'a> {
    Number(Canonical),
    Symbol { negative: bool, symbol: &'a str },
}

fn strip_sign(s: &str, styles: NumberStyles) -> (bool, &str) {
    if styles.contains(NumberStyles::ALLOW_PARENTHESES)
        && s.len() >= 2
        && s.starts_with('(')
        && s.ends_with(')')
    {
        return (true, &s[1..s.len() - 1]);
    }

    if styles.contains(NumberStyles::ALLOW_LEADING_SIGN) {
        if let Some(rest) = s.strip_prefix('-') {
            return (true, rest);
        }
        if let Some(rest) = s.strip_prefix('+') {
            return (false, rest);
        }
    }

    if styles.contains(NumberStyles::ALLOW_TRAILING_SIGN) {
        if let Some(rest) = s.strip_suffix('-') {
            return (true, rest);
        }
        if let Some(rest) = s.strip_suffix('+') {
            return (false, rest);
        }
    }

    (false, s)
}

fn take_digits(s: &str, allow_groups: bool) -> (String, &str) {
    let mut digits = String::new();
    let mut end = 0;

    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => digits.push(c),
            ',' if allow_groups && !digits.is_empty() => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }

    (digits, &s[end..])
}

fn split(input: &str, styles: NumberStyles) -> Result<Body<'_>, ParseError> {
    let invalid = || ParseError::Invalid(input.to_string());

    let mut s = input;
    if styles.contains(NumberStyles::ALLOW_LEADING_WHITE) {
        s = s.trim_start_matches(is_white);
    }
    if styles.contains(NumberStyles::ALLOW_TRAILING_WHITE) {
        s = s.trim_end_matches(is_white);
    }
    if s.is_empty() {
        return Err(ParseError::Empty);
    }

    let (negative, s) = strip_sign(s, styles);

    if s.eq_ignore_ascii_case("infinity") || s == "\u{221E}" || s.eq_ignore_ascii_case("nan") {
        return Ok(Body::Symbol {
            negative,
            symbol: s,
        });
    }

    let (integral, rest) = take_digits(s, styles.contains(NumberStyles::ALLOW_THOUSANDS));

    let (fraction, rest) = match rest.strip_prefix('.') {
        Some(after) if styles.contains(NumberStyles::ALLOW_DECIMAL_POINT) => {
            take_digits(after, false)
        }
        _ => (String::new(), rest),
    };

    if integral.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }

    let mut text = String::with_capacity(integral.len() + fraction.len() + 8);
    if negative {
        text.push('-');
    }
    text.push_str(if integral.is_empty() { "0" } else { &integral });
    text.push('.');
    text.push_str(if fraction.is_empty() { "0" } else { &fraction });

    let mut has_exponent = false;
    let rest = match rest.strip_prefix(['e', 'E']) {
        Some(after) if styles.contains(NumberStyles::ALLOW_EXPONENT) => {
            let (exp_negative, after) = match after.strip_prefix('-') {
                Some(a) => (true, a),
                None => (false, after.strip_prefix('+').unwrap_or(after)),
            };
            let (exponent, after) = take_digits(after, false);
            if exponent.is_empty() {
                return Err(invalid());
            }
            text.push('e');
            if exp_negative {
                text.push('-');
            }
            text.push_str(&exponent);
            has_exponent = true;
            after
        }
        _ => rest,
    };

    if !rest.is_empty() {
        return Err(invalid());
    }

    Ok(Body::Number(Canonical { text, has_exponent }))
}

macro_rules! parse_float {
    ($name:ident, $ty:ty) => {
        #[doc = concat!("Parse an `", stringify!($ty), "` under invariant rules")]
        pub fn $name(input: &str, styles: NumberStyles) -> Result<$ty, ParseError> {
            match split(input, styles)? {
                Body::Number(canonical) => <$ty>::from_str(&canonical.text)
                    .map_err(|_| ParseError::Invalid(input.to_string())),
                Body::Symbol { negative, symbol } => {
                    let value = if symbol.eq_ignore_ascii_case("nan") {
                        <$ty>::NAN
                    } else {
                        <$ty>::INFINITY
                    };
                    Ok(if negative { -value } else { value })
                }
            }
        }
    };
}

parse_float!(parse_f32, f32);
parse_float!(parse_f64, f64);

/// Parse a [`Decimal`] under invariant rules
pub fn parse_decimal(input: &str, styles: NumberStyles) -> Result<Decimal, ParseError> {
    match split(input, styles)? {
        Body::Number(canonical) => {
            let parsed = if canonical.has_exponent {
                Decimal::from_scientific(&canonical.text)
            } else {
                Decimal::from_str(&canonical.text)
            };
            parsed.map_err(|_| ParseError::Overflow(input.to_string()))
        }
        Body::Symbol { .. } => Err(ParseError::Invalid(input.to_string())),
    }
}
