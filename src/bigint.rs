//! Exact decimal integers for the numeric pipeline.
//!
//! Integer coercion has to stay exact past the f64/i64 precision cliff
//! (`unsigned long long` spans the full `[0, 2^64-1]`), so out-of-native
//! magnitudes are carried as sign + decimal digits. Every bound involved
//! fits `i128`, and modulo targets are at most `2^64`, which keeps the
//! arithmetic down to digit folding with `u128` intermediates.

use std::cmp::Ordering;
use std::fmt;

/// Sign + canonical decimal digits (no leading zeros; zero is non-negative).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BigInt {
    negative: bool,
    digits: String,
}

impl BigInt {
    /// Parses an optionally signed run of decimal digits. Fractions,
    /// exponents, whitespace and radix prefixes are all rejected; callers
    /// route those through the float path instead.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, body) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self::normalized(negative, body))
    }

    fn normalized(negative: bool, digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            return BigInt { negative: false, digits: "0".to_owned() };
        }
        BigInt { negative, digits: trimmed.to_owned() }
    }

    /// Exact integer part of a finite f64. `{:.0}` formatting prints the
    /// full decimal expansion of the (dyadic) value, so nothing is lost
    /// even far above 2^53.
    pub fn from_f64_integral(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let truncated = value.trunc();
        let text = format!("{truncated:.0}");
        Self::parse(&text)
    }

    pub fn is_zero(&self) -> bool {
        self.digits == "0"
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn cmp_i128(&self, rhs: i128) -> Ordering {
        let rhs_negative = rhs < 0;
        if self.negative != rhs_negative {
            return if self.negative { Ordering::Less } else { Ordering::Greater };
        }
        let rhs_digits = rhs.unsigned_abs().to_string();
        let by_magnitude = match self.digits.len().cmp(&rhs_digits.len()) {
            Ordering::Equal => self.digits.cmp(&rhs_digits),
            unequal => unequal,
        };
        if self.negative { by_magnitude.reverse() } else { by_magnitude }
    }

    /// Exact value when it fits `i128`.
    pub fn to_i128(&self) -> Option<i128> {
        if self.digits.len() > 39 {
            return None;
        }
        let magnitude: u128 = self.digits.parse().ok()?;
        if self.negative {
            if magnitude > i128::MIN.unsigned_abs() {
                return None;
            }
            Some((magnitude as i128).wrapping_neg())
        } else {
            i128::try_from(magnitude).ok()
        }
    }

    /// Non-negative residue modulo `2^bits` (`bits` ≤ 64). Digits are
    /// folded Horner-style; `acc < 2^64` keeps `acc * 10 + d` inside u128.
    pub fn mod_pow2(&self, bits: u32) -> u128 {
        let modulus = 1u128 << bits;
        let mut acc = 0u128;
        for digit in self.digits.bytes() {
            acc = (acc * 10 + u128::from(digit - b'0')) % modulus;
        }
        if self.negative && acc != 0 {
            acc = modulus - acc;
        }
        acc
    }

    /// Nearest f64 (correctly rounded decimal conversion).
    pub fn to_f64(&self) -> f64 {
        match self.to_string().parse::<f64>() {
            Ok(float) => float,
            Err(_) => f64::NAN,
        }
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.digits)
        } else {
            f.write_str(&self.digits)
        }
    }
}

impl From<i64> for BigInt {
    fn from(value: i64) -> Self {
        Self::normalized(value < 0, &value.unsigned_abs().to_string())
    }
}

impl From<u64> for BigInt {
    fn from(value: u64) -> Self {
        Self::normalized(false, &value.to_string())
    }
}

impl From<i128> for BigInt {
    fn from(value: i128) -> Self {
        Self::normalized(value < 0, &value.unsigned_abs().to_string())
    }
}

impl From<u128> for BigInt {
    fn from(value: u128) -> Self {
        Self::normalized(false, &value.to_string())
    }
}
