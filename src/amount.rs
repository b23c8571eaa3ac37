//! Monetary amounts as they appear in the statement's amount column.
//!
//! Uses `rust_decimal` internally so that re-rendering a parsed amount never
//! picks up binary floating-point noise.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Thousands separator used by the report.
const GROUP_SEPARATOR: char = ',';

/// A parsed amount, always held in canonical (normalized) form.
///
/// Canonical form has no trailing fractional zeros, no thousands separators
/// and no negative zero, so `Display` output re-parses to the same string.
///
/// # Examples
///
/// ```
/// use statement_cleaner::Amount;
///
/// let amount = Amount::parse("1234.50").unwrap();
/// assert_eq!(amount.to_string(), "1234.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    /// Creates an `Amount` from a `Decimal`, normalizing it.
    pub fn new(value: Decimal) -> Self {
        let normalized = value.normalize();
        if normalized.is_zero() {
            Amount::ZERO
        } else {
            Amount(normalized)
        }
    }

    /// Strips thousands separators from a raw cell value.
    ///
    /// No other cleanup happens: surrounding whitespace is kept and will make
    /// the value fail to parse.
    pub fn clean(raw: &str) -> String {
        raw.replace(GROUP_SEPARATOR, "")
    }

    /// Returns `true` if a cleaned amount string is written as negative.
    ///
    /// This is a textual check on the first character, made before parsing.
    pub fn is_negative_token(cleaned: &str) -> bool {
        cleaned.starts_with('-')
    }

    /// Parses a cleaned amount string.
    ///
    /// Plain decimal notation is tried first, then scientific notation.
    /// Digit separators other than the stripped `,` are not accepted.
    pub fn parse(cleaned: &str) -> Result<Self, rust_decimal::Error> {
        if cleaned.contains('_') {
            return Err(rust_decimal::Error::ErrorString(format!(
                "Invalid decimal: unexpected '_' in {:?}",
                cleaned
            )));
        }
        match Decimal::from_str(cleaned) {
            Ok(value) => Ok(Amount::new(value)),
            Err(err) => Decimal::from_scientific(cleaned)
                .map(Amount::new)
                .map_err(|_| err),
        }
    }

    /// Returns the amount with its sign flipped.
    pub fn negate(self) -> Self {
        Amount::new(-self.0)
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if this value is strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
