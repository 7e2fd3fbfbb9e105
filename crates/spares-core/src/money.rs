//! # Money Module
//!
//! Provides the `Money` type for rupee amounts.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE GST HALVING PROBLEM                                                │
//! │                                                                         │
//! │  SGST = subtotal × rate / 200                                          │
//! │    ₹100.05 × 5 / 200 = ₹2.50125                                       │
//! │                                                                         │
//! │  Integer paise would round here, per line, and the error compounds     │
//! │  across a multi-line invoice.                                          │
//! │                                                                         │
//! │  OUR SOLUTION: exact base-10 decimals (rust_decimal)                   │
//! │    Every intermediate value is exact.                                  │
//! │    Rounding to 2 places happens only when an amount is displayed.      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use spares_core::money::Money;
//!
//! let price = Money::from_paise(10050); // ₹100.50
//! let line = price * 3;                 // ₹301.50
//! assert_eq!(line.to_string(), "₹301.50");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// An exact rupee amount.
///
/// Serialized as a JSON number (`354` or `2.5`) so the wire format matches
/// what shop clients already send and read.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Part.price ──► LineTax.subtotal ──► sgst / cgst ──► grand_total       │
/// │                                                                         │
/// │  SalesHistoryRecord.total_amount ──► SaleOutcome.invoice_total          │
/// │                                                                         │
/// │  invoice_total ──► "₹354.00" and "Three Hundred Fifty Four Rupees Only" │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    /// Wraps an exact decimal rupee amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ```rust
    /// use spares_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(354).to_string(), "₹354.00");
    /// ```
    #[inline]
    pub fn from_rupees(rupees: i64) -> Self {
        Money(Decimal::from(rupees))
    }

    /// Creates a Money value from paise (1/100 rupee).
    #[inline]
    pub fn from_paise(paise: i64) -> Self {
        Money(Decimal::new(paise, 2))
    }

    /// Returns zero rupees.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the exact underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is below zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// `self × quantity`, `None` when the product leaves the decimal range.
    pub fn checked_mul(self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }

    /// `self + rhs`, `None` on overflow.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Rounds to paise, half away from zero.
    ///
    /// Only presentation code calls this. Accumulation always uses the
    /// exact value.
    ///
    /// ```rust
    /// use spares_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let sgst = Money::new(Decimal::new(250125, 5)); // 2.50125
    /// assert_eq!(sgst.rounded(), Money::from_paise(250));
    /// ```
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Whole rupees, paise truncated. Negative amounts yield zero.
    pub fn whole_rupees(&self) -> u64 {
        self.0.trunc().to_u64().unwrap_or(0)
    }

    /// Parses a stored decimal string such as `"354.00"`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Decimal::from_str(raw.trim())
            .map(Money)
            .map_err(|e| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: e.to_string(),
            })
    }

    /// Canonical storage form: exact, normalized, no exponent.
    pub fn to_storage_string(&self) -> String {
        self.0.normalize().to_string()
    }
}

// =============================================================================
// Operators
// =============================================================================

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

/// Unit price × quantity.
///
/// The operators saturate at the edge of the decimal range rather than
/// panic. Code that must not silently clamp uses [`Money::checked_mul`].
impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, quantity: i64) -> Money {
        Money(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

/// Displays as `₹354.00`, rounded to paise.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.rounded().0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_paise() {
        assert_eq!(Money::from_rupees(354).to_string(), "₹354.00");
        assert_eq!(Money::from_paise(250).to_string(), "₹2.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_rounding_only_at_presentation() {
        // 3 × ₹0.3333 accumulates exactly; rounding each first would drift
        let third = Money::new(Decimal::new(3333, 4));
        let total: Money = [third, third, third].iter().sum();
        assert_eq!(total.amount(), Decimal::new(9999, 4));
        assert_eq!(total.rounded(), Money::from_paise(100));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        let half_paisa = Money::new(Decimal::new(1005, 3)); // 1.005
        assert_eq!(half_paisa.rounded(), Money::from_paise(101));
    }

    #[test]
    fn test_multiply_by_quantity() {
        let price = Money::from_paise(10050);
        assert_eq!(price * 3, Money::from_paise(30150));
    }

    #[test]
    fn test_overflow_is_checked_or_saturated() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.checked_mul(2), None);
        assert_eq!(huge.checked_add(Money::from_rupees(1)), None);
        assert_eq!(Money::from_rupees(3).checked_mul(4), Some(Money::from_rupees(12)));

        // operators clamp instead of panicking
        assert_eq!(huge * 2, huge);
        assert_eq!(huge + huge, huge);
    }

    #[test]
    fn test_whole_rupees_truncates() {
        assert_eq!(Money::from_paise(35499).whole_rupees(), 354);
        assert_eq!(Money::from_rupees(-5).whole_rupees(), 0);
    }

    #[test]
    fn test_storage_string_parses_back() {
        let price = Money::new(Decimal::new(250125, 5));
        let stored = price.to_storage_string();
        assert_eq!(stored, "2.50125");
        assert_eq!(Money::parse(&stored).unwrap(), price);
        assert!(Money::parse("abc").is_err());
    }

    #[test]
    fn test_serializes_as_json_number() {
        let json = serde_json::to_string(&Money::from_rupees(354)).unwrap();
        assert_eq!(json, "354.0");
        let back: Money = serde_json::from_str("27").unwrap();
        assert_eq!(back, Money::from_rupees(27));
    }
}
