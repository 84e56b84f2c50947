//! Numeric interpretation shared by the integer and float converters.
//!
//! A castable value interprets as one of three exact forms: a machine
//! integer, an arbitrary-precision integer, or a double. Numeric text
//! parses by longest valid prefix, so `"12abc"` reads as 12 and text with
//! no numeric prefix reads as 0. Integer-looking text of any magnitude
//! stays exact instead of detouring through floating point.

use std::cmp::Ordering;

use crate::bigint::BigInt;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Numeric {
    Int(i64),
    Big(BigInt),
    Double(f64),
}

impl Numeric {
    pub(crate) fn to_f64(&self) -> f64 {
        match self {
            Numeric::Int(i) => *i as f64,
            Numeric::Big(big) => big.to_f64(),
            Numeric::Double(d) => *d,
        }
    }
}

/// Booleans, numbers and strings interpret; null, arrays, objects,
/// callables, iterators, records and resources do not.
pub(crate) fn interpret(value: &Value) -> Option<Numeric> {
    match value {
        Value::Bool(b) => Some(Numeric::Int(i64::from(*b))),
        Value::Int(i) => Some(Numeric::Int(*i)),
        Value::BigInt(big) => Some(Numeric::Big(big.clone())),
        Value::Double(d) => Some(Numeric::Double(*d)),
        Value::Str(s) => Some(parse_numeric_text(s.as_bytes())),
        Value::Bytes(bytes) => Some(parse_numeric_text(bytes)),
        _ => None,
    }
}

/// Longest numeric prefix of `text`, or 0 when there is none. A prefix
/// without fraction or exponent parses exactly; otherwise it parses as a
/// double.
fn parse_numeric_text(text: &[u8]) -> Numeric {
    let mut index = 0;
    while index < text.len() && matches!(text[index], b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c) {
        index += 1;
    }
    let start = index;
    if index < text.len() && matches!(text[index], b'+' | b'-') {
        index += 1;
    }
    let int_start = index;
    while index < text.len() && text[index].is_ascii_digit() {
        index += 1;
    }
    let int_end = index;
    let mut float_form = false;
    if index < text.len() && text[index] == b'.' {
        let mut after = index + 1;
        while after < text.len() && text[after].is_ascii_digit() {
            after += 1;
        }
        // a bare "." is not a number
        if after > index + 1 || int_end > int_start {
            float_form = true;
            index = after;
        }
    }
    if int_end == int_start && !float_form {
        return Numeric::Int(0);
    }
    if index < text.len() && matches!(text[index], b'e' | b'E') {
        let mut after = index + 1;
        if after < text.len() && matches!(text[after], b'+' | b'-') {
            after += 1;
        }
        let exponent_digits = after;
        while after < text.len() && text[after].is_ascii_digit() {
            after += 1;
        }
        if after > exponent_digits {
            float_form = true;
            index = after;
        }
    }
    // the scanned range is ASCII
    let prefix = std::str::from_utf8(&text[start..index]).unwrap_or("0");
    if float_form {
        return Numeric::Double(prefix.parse::<f64>().unwrap_or(0.0));
    }
    match prefix.parse::<i64>() {
        Ok(int) => Numeric::Int(int),
        Err(_) => match BigInt::parse(prefix) {
            Some(big) => Numeric::Big(big),
            None => Numeric::Int(0),
        },
    }
}

/// Exact order of a double against an integer bound. Splits the double
/// into integer part and fraction so the comparison never rounds through
/// `f64`, which matters at the 2^63 and 2^64 boundaries.
pub(crate) fn cmp_f64_i128(value: f64, bound: i128) -> Ordering {
    if value.is_infinite() {
        return if value > 0.0 { Ordering::Greater } else { Ordering::Less };
    }
    let Some(truncated) = BigInt::from_f64_integral(value) else {
        return Ordering::Equal;
    };
    match truncated.cmp_i128(bound) {
        Ordering::Equal => {
            let fraction = value.fract();
            if fraction > 0.0 {
                Ordering::Greater
            } else if fraction < 0.0 {
                Ordering::Less
            } else {
                Ordering::Equal
            }
        }
        order => order,
    }
}
