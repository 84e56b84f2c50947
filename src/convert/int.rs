//! Integer coercion for the eight fixed-width kinds under the three
//! out-of-range policies.
//!
//! All range tests and wrapping happen in exact arithmetic. Doubles cross
//! into the integer domain through [`BigInt::from_f64_integral`], so a
//! value sitting one past `i64::MAX` is recognized as out of range rather
//! than silently rounded in. Results beyond `i64` (only possible for
//! `unsigned long long`) come back as big integers.

use std::cmp::Ordering;

use crate::bigint::BigInt;
use crate::convert::num::{self, cmp_f64_i128, Numeric};
use crate::error::{expected, CoercionError};
use crate::ty::{IntKind, IntPolicy};
use crate::value::Value;

pub(crate) fn to_integer(
    value: &Value,
    kind: IntKind,
    policy: IntPolicy,
) -> Result<Value, CoercionError> {
    let (min, max) = kind.range();
    let Some(number) = num::interpret(value) else {
        return Err(CoercionError::invalid_argument(
            expected(&described(kind), &value.repr()),
            None,
        ));
    };
    match policy {
        IntPolicy::EnforceRange => {
            let truncated = match number {
                Numeric::Int(i) => Some(BigInt::from(i)),
                Numeric::Big(big) => Some(big),
                Numeric::Double(d) => BigInt::from_f64_integral(d),
            };
            match truncated {
                Some(int)
                    if int.cmp_i128(min) != Ordering::Less
                        && int.cmp_i128(max) != Ordering::Greater =>
                {
                    Ok(emit(int.to_i128().unwrap_or(0)))
                }
                // non-finite or out of range
                _ => Err(CoercionError::domain(
                    expected(&described(kind), &value.repr()),
                    None,
                )),
            }
        }
        IntPolicy::Clamp => {
            let clamped = match number {
                Numeric::Int(i) => i128::from(i).clamp(min, max),
                Numeric::Big(big) => match (big.cmp_i128(min), big.cmp_i128(max)) {
                    (Ordering::Less, _) => min,
                    (_, Ordering::Greater) => max,
                    _ => big.to_i128().unwrap_or(0),
                },
                Numeric::Double(d) if d.is_nan() => 0,
                Numeric::Double(d) => match (cmp_f64_i128(d, min), cmp_f64_i128(d, max)) {
                    (Ordering::Less, _) => min,
                    (_, Ordering::Greater) => max,
                    _ => BigInt::from_f64_integral(d.round_ties_even())
                        .and_then(|big| big.to_i128())
                        .unwrap_or(0),
                },
            };
            Ok(emit(clamped))
        }
        IntPolicy::Wrap => {
            let bits = kind.bits();
            let modulus = 1i128 << bits;
            let residue = match number {
                Numeric::Int(i) => i128::from(i).rem_euclid(modulus) as u128,
                Numeric::Big(big) => big.mod_pow2(bits),
                Numeric::Double(d) => match BigInt::from_f64_integral(d) {
                    Some(big) => big.mod_pow2(bits),
                    // NaN and the infinities wrap to zero
                    None => 0,
                },
            };
            let int = if kind.is_signed() && residue >= 1u128 << (bits - 1) {
                residue as i128 - modulus
            } else {
                residue as i128
            };
            Ok(emit(int))
        }
    }
}

/// Expected-type label, bounds written out in full.
pub(crate) fn described(kind: IntKind) -> String {
    let (min, max) = kind.range();
    format!("{} (an integer in the range of {min} to {max})", kind.keyword())
}

/// In-range result as a host value; beyond `i64` it becomes a big integer.
fn emit(int: i128) -> Value {
    match i64::try_from(int) {
        Ok(int) => Value::Int(int),
        Err(_) => Value::BigInt(BigInt::from(int)),
    }
}
