//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    4750000 * 0.9 = 4274999.999999999  ❌ WRONG!                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer đồng                                             │
//! │    VND has no minor unit, so one i64 counts whole đồng.                │
//! │    Percentages are applied with integer math and explicit rounding.    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stride_core::money::Money;
//!
//! let price = Money::new(4_750_000);
//! let line_total = price.multiply_quantity(2);
//! assert_eq!(line_total, Money::new(9_500_000));
//! assert_eq!(line_total.to_string(), "9.500.000 ₫");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in whole đồng.
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate differences may go negative; the public
///   totals clamp at zero through [`Money::saturating_sub`]
/// - **Saturating arithmetic**: prices come from the backend, so `+`, `-`
///   and [`Money::multiply_quantity`] stop at the i64 bounds instead of
///   overflowing
/// - **Single field tuple struct**: serializes as a plain JSON number, which
///   is what the backend sends and expects
///
/// ## Where Money is Used
/// ```text
/// Variant.price ──► PriceEngine ──► CartLine.price ──► line total
///                                                          │
///                   Voucher discount ◄── Cart.subtotal ◄───┘
///                          │
///                          ▼
///                    Cart.total ──► CreateOrderRequest ──► backend
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole đồng.
    #[inline]
    pub const fn new(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in whole đồng.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use stride_core::money::Money;
    ///
    /// let unit_price = Money::new(1_290_000);
    /// assert_eq!(unit_price.multiply_quantity(3).amount(), 3_870_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Returns `percent`% of this amount, rounded half up to the nearest đồng.
    ///
    /// `percent` is clamped to 0..=100.
    ///
    /// ## Example
    /// ```rust
    /// use stride_core::money::Money;
    ///
    /// assert_eq!(Money::new(9_500_000).percentage(10), Money::new(950_000));
    /// assert_eq!(Money::new(15).percentage(10), Money::new(2)); // 1.5 → 2
    /// ```
    pub fn percentage(&self, percent: i64) -> Money {
        let percent = percent.clamp(0, 100);
        // i128 keeps `amount * percent` from overflowing on large totals
        let value = (self.0 as i128 * percent as i128 + 50) / 100;
        Money(value as i64)
    }

    /// Subtracts `other`, never going below zero.
    ///
    /// ## Example
    /// ```rust
    /// use stride_core::money::Money;
    ///
    /// let total = Money::new(1_500_000).saturating_sub(Money::new(2_000_000));
    /// assert!(total.is_zero());
    /// ```
    #[inline]
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// Amount with dot thousands separators and no symbol: `"9.500.000"`.
    pub fn grouped(&self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if self.0 < 0 {
            grouped.push('-');
        }
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        grouped
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Vietnamese display format: `9.500.000 ₫`.
///
/// The POS screen renders its own strings; this is for invoices, logs and
/// error messages.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ₫", self.grouped())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::new(9_500_000).to_string(), "9.500.000 ₫");
        assert_eq!(Money::new(500).to_string(), "500 ₫");
        assert_eq!(Money::new(1_000).to_string(), "1.000 ₫");
        assert_eq!(Money::new(0).to_string(), "0 ₫");
        assert_eq!(Money::new(-250_000).to_string(), "-250.000 ₫");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::new(1_000_000);
        let b = Money::new(250_000);

        assert_eq!((a + b).amount(), 1_250_000);
        assert_eq!((a - b).amount(), 750_000);
        assert_eq!(a.multiply_quantity(3).amount(), 3_000_000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.amount(), 1_500_000);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let huge = Money::new(i64::MAX / 2);
        assert_eq!(huge.multiply_quantity(9_999).amount(), i64::MAX);
        assert_eq!((huge + huge + huge).amount(), i64::MAX);

        let mut total = Money::new(i64::MAX);
        total += Money::new(1);
        assert_eq!(total.amount(), i64::MAX);
        assert_eq!((Money::new(i64::MIN) - Money::new(1)).amount(), i64::MIN);
        assert!(Money::new(i64::MIN).saturating_sub(Money::new(1)).is_zero());

        let sum: Money = vec![Money::new(i64::MAX), Money::new(1)].into_iter().sum();
        assert_eq!(sum.amount(), i64::MAX);
        assert_eq!(Money::new(i64::MAX).percentage(100).amount(), i64::MAX);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(Money::new(4_750_000).percentage(10).amount(), 475_000);
        assert_eq!(Money::new(999).percentage(15).amount(), 150); // 149.85
        assert_eq!(Money::new(10).percentage(5).amount(), 1); // 0.5
    }

    #[test]
    fn test_percentage_clamps_out_of_range() {
        assert_eq!(Money::new(1_000).percentage(150).amount(), 1_000);
        assert_eq!(Money::new(1_000).percentage(-5).amount(), 0);
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        assert_eq!(Money::new(500).saturating_sub(Money::new(200)).amount(), 300);
        assert!(Money::new(500).saturating_sub(Money::new(900)).is_zero());
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Money::new(4_750_000)).unwrap();
        assert_eq!(json, "4750000");
        let back: Money = serde_json::from_str("4750000").unwrap();
        assert_eq!(back, Money::new(4_750_000));
    }
}
