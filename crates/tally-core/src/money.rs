//! # Money Module
//!
//! Provides the `Money` type for receipt totals and item prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  As a float, 35.35 is stored as 35.3499999999999943...                 │
//! │    35.35 % 0.25 == 0.0999999...  (looks like "not a quarter")  ❌       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    3535 % 25 == 10               (exact, no tolerance needed)  ✅       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Receipts still arrive as decimal amounts (`"total": 35.35`). They are
//! converted to cents once, at the edge, by [`decimal_cents`].
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let total: Money = "35.00".parse().unwrap();
//! assert_eq!(total.cents(), 3500);
//! assert!(total.is_multiple_of(100));  // round dollar
//! assert!(total.is_multiple_of(25));   // multiple of a quarter
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Represents a monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: Matches the integer point arithmetic used by rules
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the dollar portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks whether the amount is an exact multiple of `step` cents.
    ///
    /// Zero is a multiple of every step. A zero step matches only zero.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert!(Money::from_cents(1075).is_multiple_of(25));
    /// assert!(!Money::from_cents(1001).is_multiple_of(25));
    /// assert!(Money::zero().is_multiple_of(100));
    /// ```
    #[inline]
    pub const fn is_multiple_of(&self, step: i64) -> bool {
        if step == 0 {
            return self.0 == 0;
        }
        self.0 % step == 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$D.CC`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Parses a non-negative decimal amount such as `35`, `35.5` or `35.00`.
///
/// ## Rules
/// - Digits only, with an optional `.` followed by one or two digits
/// - No sign, no exponent, no more than two decimal places
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        if s.starts_with('-') {
            return Err(invalid("must not be negative"));
        }

        let (whole, fraction) = match s.split_once('.') {
            Some((_, "")) => return Err(invalid("missing digits after decimal point")),
            Some((whole, fraction)) => (whole, fraction),
            None => (s, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(invalid("expected a decimal amount like 35.00"));
        }
        if fraction.len() > 2 {
            return Err(invalid("more than two decimal places"));
        }

        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => i64::from(fraction.as_bytes()[0] - b'0') * 10,
            _ => i64::from(fraction.as_bytes()[0] - b'0') * 10 + i64::from(fraction.as_bytes()[1] - b'0'),
        };

        whole
            .parse::<i64>()
            .ok()
            .and_then(|dollars| dollars.checked_mul(100))
            .and_then(|cents| cents.checked_add(fraction_cents))
            .map(Money)
            .ok_or_else(|| invalid("amount is too large"))
    }
}

// =============================================================================
// Serde: decimal amounts stored as cents
// =============================================================================

/// `#[serde(with = "decimal_cents")]` for `i64` cent fields that appear as
/// decimal amounts on the wire.
///
/// Reads a JSON number (`35`, `35.5`, `35.00`) or string (`"35.00"`) and
/// rejects negatives and anything finer than a cent. Writes a number.
pub mod decimal_cents {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    use super::Money;

    pub fn serialize<S>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(*cents as f64 / 100.0)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CentsVisitor)
    }

    struct CentsVisitor;

    impl<'de> Visitor<'de> for CentsVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative amount with at most two decimal places")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            self.visit_str(&v.to_string())
        }

        // f64 Display is the shortest string that round-trips, so 35.35
        // prints as "35.35" and parses to exactly 3535 cents.
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if !v.is_finite() {
                return Err(E::custom("amount must be finite"));
            }
            self.visit_str(&v.to_string())
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            v.parse::<Money>().map(|m| m.cents()).map_err(E::custom)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
