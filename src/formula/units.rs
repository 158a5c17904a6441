//! Quantity and unit tokens
//!
//! Lexical pieces of a formula: exact decimal amounts, unit strings, and the
//! split of a single whitespace token into name / number / unit parts.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// Largest number of decimal digits accepted in an amount
///
/// Amounts are also limited to 19 significant digits (the mantissa is a `u64`,
/// at most 18446744073709551615 with the point removed). A number past either
/// limit is not read as a quantity: its token stays a plain name, so the
/// ingredient is invalid and takes no part in ratio signatures.
pub const MAX_SCALE: u32 = 18;

// ============================================================================
// Amount
// ============================================================================

/// A non-negative decimal quantity kept exactly as typed
///
/// `10.5` is stored as mantissa 105, scale 1. Keeping the typed digits lets
/// ratio signatures scale amounts to integers without float rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Amount {
    mantissa: u64,
    scale: u32,
}

impl Amount {
    /// The zero amount carried by invalid ingredients
    pub const ZERO: Amount = Amount { mantissa: 0, scale: 0 };

    /// Build an amount from an integer mantissa and a decimal scale
    ///
    /// Returns None when the scale exceeds [`MAX_SCALE`].
    pub fn new(mantissa: u64, scale: u32) -> Option<Self> {
        if scale > MAX_SCALE {
            return None;
        }
        Some(Self { mantissa, scale })
    }

    /// Parse `digits` or `digits.digits`
    ///
    /// Signs, exponents, separators other than `.` and a trailing `.` are
    /// rejected, as are values beyond the limits described on [`MAX_SCALE`].
    pub fn parse(s: &str) -> Option<Self> {
        let (int_part, frac_part) = match s.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (s, None),
        };

        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if let Some(frac) = frac_part {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
        }

        let mut mantissa: u64 = 0;
        for b in int_part.bytes().chain(frac_part.unwrap_or("").bytes()) {
            mantissa = mantissa
                .checked_mul(10)?
                .checked_add(u64::from(b - b'0'))?;
        }

        let scale = frac_part.map(|f| f.len() as u32).unwrap_or(0);
        Self::new(mantissa, scale)
    }

    /// The digits of the amount with the decimal point removed
    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    /// Number of decimal digits as typed
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Approximate floating-point value, for display and fallback ratios
    pub fn as_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }

    /// The amount multiplied by `10^target_scale`, as an exact integer
    ///
    /// Returns None when `target_scale` is smaller than the amount's own scale
    /// (the result would not be an integer).
    pub fn rescale(&self, target_scale: u32) -> Option<u128> {
        let shift = target_scale.checked_sub(self.scale)?;
        10u128
            .checked_pow(shift)
            .and_then(|factor| u128::from(self.mantissa).checked_mul(factor))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        let common = self.scale.max(other.scale);
        // Both scales are capped at MAX_SCALE, so rescaling a u64 mantissa fits in u128
        let lhs = self.rescale(common).unwrap_or(u128::MAX);
        let rhs = other.rescale(common).unwrap_or(u128::MAX);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let digits = format!("{:0width$}", self.mantissa, width = self.scale as usize + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - self.scale as usize);
        write!(f, "{}.{}", int_part, frac_part)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

// ============================================================================
// Token Recognition
// ============================================================================

/// Whether a string is a unit: letters, CJK ideographs and `%`, no digits
pub fn is_unit(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c == '%' || c.is_alphabetic())
}

/// Shape of a single whitespace-delimited token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape<'a> {
    /// No quantity inside, e.g. `朱红` or `g`
    Name(&'a str),
    /// A quantity without a leading name, e.g. `10g` or `10` (unit empty)
    Quantity { amount: Amount, unit: &'a str },
    /// A name with a quantity attached, e.g. `朱红10g` or `朱红10` (unit empty)
    Named {
        name: &'a str,
        amount: Amount,
        unit: &'a str,
    },
}

/// Split a token into its name, number and unit parts
///
/// The name runs up to the first ASCII digit. The number is `digits` with an
/// optional `.digits`, and whatever follows must be a unit. A token whose tail
/// is not a unit (e.g. `10.g` or `5g!`) is treated as a plain name.
pub fn classify_token(token: &str) -> TokenShape<'_> {
    let Some(number_start) = token.find(|c: char| c.is_ascii_digit()) else {
        return TokenShape::Name(token);
    };

    let bytes = token.as_bytes();
    let mut number_end = number_start;
    while number_end < bytes.len() && bytes[number_end].is_ascii_digit() {
        number_end += 1;
    }
    if number_end + 1 < bytes.len()
        && bytes[number_end] == b'.'
        && bytes[number_end + 1].is_ascii_digit()
    {
        number_end += 1;
        while number_end < bytes.len() && bytes[number_end].is_ascii_digit() {
            number_end += 1;
        }
    }

    let name = &token[..number_start];
    let unit = &token[number_end..];
    if !unit.is_empty() && !is_unit(unit) {
        return TokenShape::Name(token);
    }
    let Some(amount) = Amount::parse(&token[number_start..number_end]) else {
        return TokenShape::Name(token);
    };

    if name.is_empty() {
        TokenShape::Quantity { amount, unit }
    } else {
        TokenShape::Named { name, amount, unit }
    }
}
