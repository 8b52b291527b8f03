//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a settlement engine that is a double-credit or a lost cent:         │
//! │    $100.00 split across 3 sellers must attribute EVERY cent to          │
//! │    exactly one seller - no more, no less.                               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    All amounts are i64 cents. Rounding happens at exactly one           │
//! │    boundary (rate application) and is round-half-up by contract.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vendora_core::money::Money;
//! use vendora_core::types::CommissionRate;
//!
//! let gross = Money::from_cents(6000);              // $60.00
//! let rate = CommissionRate::from_bps(1500);        // 15.00%
//!
//! let commission = gross.apply_rate(rate);
//! assert_eq!(commission.cents(), 900);              // $9.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::CommissionRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic intermediates may be negative even though
///   persisted ledger amounts never are
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// OrderLine.unit_price × quantity ──► group subtotal ──► SubOrder.subtotal
///                                          │
///                                          ▼
///                              EarningsBreakdown (commission, fees, net)
///                                          │
///                                          ▼
///                              EarningsRecord ──► Payout.amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and API all use cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
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

    /// Applies a basis-point rate with round-half-up at the cent boundary.
    ///
    /// ## Rounding Contract
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ROUND-HALF-UP AT THE MINOR-UNIT BOUNDARY                           │
    /// │                                                                     │
    /// │  commission = round(gross × rate / 100)                             │
    /// │                                                                     │
    /// │  In integer math with basis points (1500 bps = 15.00%):             │
    /// │    (cents × bps + 5000) / 10000                                     │
    /// │                                                                     │
    /// │  The +5000 is half the divisor, which rounds .5 and above up.       │
    /// │  Example: 3333 cents × 2.9% = 96.657 → 97 cents                     │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use vendora_core::money::Money;
    /// use vendora_core::types::CommissionRate;
    ///
    /// let gross = Money::from_cents(4000);
    /// let rate = CommissionRate::from_bps(1500); // 15.00%
    /// assert_eq!(gross.apply_rate(rate).cents(), 600);
    /// ```
    pub fn apply_rate(&self, rate: CommissionRate) -> Money {
        // i128 intermediates prevent overflow on large amounts
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Subtracts, clamping the result at zero.
    ///
    /// Used for the net-amount guarantee: a tiny order whose fees exceed its
    /// gross yields a zero seller payout, never a negative balance.
    ///
    /// ## Example
    /// ```rust
    /// use vendora_core::money::Money;
    ///
    /// let gross = Money::from_cents(25);
    /// let fees = Money::from_cents(31);
    /// assert_eq!(gross.saturating_sub(fees), Money::zero());
    /// ```
    #[inline]
    pub const fn saturating_sub(&self, other: Money) -> Money {
        let diff = self.0 - other.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }

    /// Multiplies money by a quantity (line totals).
    ///
    /// ## Example
    /// ```rust
    /// use vendora_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Consumers format for display themselves
/// to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summation over iterators (seller aggregate totals).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
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
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_apply_rate_exact() {
        // $60.00 at 15.00% = $9.00, no rounding needed
        let gross = Money::from_cents(6000);
        let rate = CommissionRate::from_bps(1500);
        assert_eq!(gross.apply_rate(rate).cents(), 900);
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // 50 cents at 2.9% = 1.45 → 1
        assert_eq!(
            Money::from_cents(50).apply_rate(CommissionRate::from_bps(290)).cents(),
            1
        );
        // 250 cents at 10.00% = 25 exactly
        assert_eq!(
            Money::from_cents(250).apply_rate(CommissionRate::from_bps(1000)).cents(),
            25
        );
        // 25 cents at 10.00% = 2.5 → rounds up to 3
        assert_eq!(
            Money::from_cents(25).apply_rate(CommissionRate::from_bps(1000)).cents(),
            3
        );
    }

    #[test]
    fn test_saturating_sub_clamps_at_zero() {
        let gross = Money::from_cents(25);
        let fees = Money::from_cents(31);
        assert_eq!(gross.saturating_sub(fees), Money::zero());

        let gross = Money::from_cents(100);
        let fees = Money::from_cents(31);
        assert_eq!(gross.saturating_sub(fees).cents(), 69);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    }

    #[test]
    fn test_sum() {
        let total: Money = [1000, 2000, 500]
            .into_iter()
            .map(Money::from_cents)
            .sum();
        assert_eq!(total.cents(), 3500);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }
}
