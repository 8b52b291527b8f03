//! # Earnings Calculator
//!
//! Pure fee/earnings breakdown for a gross amount and a commission rate.
//!
//! ## Fee Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gross (seller group subtotal, cents)                                   │
//! │    │                                                                    │
//! │    ├── commission      = round_half_up(gross × rate)                    │
//! │    ├── processing fee  = round_half_up(gross × 2.9%) + 30               │
//! │    ├── platform fee    = 0 (extension hook)                             │
//! │    │                                                                    │
//! │    └── net = max(0, gross − commission − processing − platform)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The processing fee models a card-processor structure (percentage + flat
//! per-settlement amount). The net amount clamps at zero instead of erroring:
//! a tiny order whose fees exceed its gross yields a zero seller payout, not
//! a negative balance.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::CommissionRate;

/// Processing fee percentage: 2.9% in basis points.
pub const PROCESSING_FEE_BPS: u32 = 290;

/// Flat processing fee per settlement, in cents.
pub const PROCESSING_FEE_FLAT_CENTS: i64 = 30;

/// The computed fee/earnings breakdown for one seller group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsBreakdown {
    pub gross_cents: i64,
    pub commission_rate_bps: u32,
    pub commission_cents: i64,
    pub processing_fee_cents: i64,
    pub platform_fee_cents: i64,
    pub net_cents: i64,
}

impl EarningsBreakdown {
    /// Returns the net amount as Money.
    #[inline]
    pub fn net(&self) -> Money {
        Money::from_cents(self.net_cents)
    }
}

/// Computes the fee breakdown for a gross amount at a commission rate.
///
/// Pure function, no I/O. Guarantees `net >= 0`.
///
/// ## Example
/// ```rust
/// use vendora_core::earnings::calculate_earnings;
/// use vendora_core::money::Money;
/// use vendora_core::types::CommissionRate;
///
/// let b = calculate_earnings(Money::from_cents(6000), CommissionRate::from_bps(1500));
/// assert_eq!(b.commission_cents, 900);
/// assert_eq!(b.processing_fee_cents, 204); // round(6000 × 2.9%) + 30
/// assert_eq!(b.net_cents, 4896);
/// ```
pub fn calculate_earnings(gross: Money, rate: CommissionRate) -> EarningsBreakdown {
    let commission = gross.apply_rate(rate);
    let processing_fee = gross.apply_rate(CommissionRate::from_bps(PROCESSING_FEE_BPS))
        + Money::from_cents(PROCESSING_FEE_FLAT_CENTS);
    // Extension hook: platform-level surcharge, zero for now
    let platform_fee = Money::zero();

    let net = gross.saturating_sub(commission + processing_fee + platform_fee);

    EarningsBreakdown {
        gross_cents: gross.cents(),
        commission_rate_bps: rate.bps(),
        commission_cents: commission.cents(),
        processing_fee_cents: processing_fee.cents(),
        platform_fee_cents: platform_fee.cents(),
        net_cents: net.cents(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_6000_at_fifteen_percent() {
        // 6000 cents at 15%: commission 900, fee round(174)+30=204, net 4896
        let b = calculate_earnings(Money::from_cents(6000), CommissionRate::from_bps(1500));
        assert_eq!(b.commission_cents, 900);
        assert_eq!(b.processing_fee_cents, 204);
        assert_eq!(b.platform_fee_cents, 0);
        assert_eq!(b.net_cents, 4896);
    }

    #[test]
    fn test_breakdown_4000_at_fifteen_percent() {
        // 4000 cents at 15%: commission 600, fee round(116)+30=146, net 3254
        let b = calculate_earnings(Money::from_cents(4000), CommissionRate::from_bps(1500));
        assert_eq!(b.commission_cents, 600);
        assert_eq!(b.processing_fee_cents, 146);
        assert_eq!(b.net_cents, 3254);
    }

    #[test]
    fn test_net_never_negative() {
        // 25 cents at 15%: commission 4, fee 1+30=31; 25 − 35 clamps to 0
        let b = calculate_earnings(Money::from_cents(25), CommissionRate::from_bps(1500));
        assert_eq!(b.net_cents, 0);
        assert!(b.net_cents >= 0);
    }

    #[test]
    fn test_zero_gross() {
        // Flat fee still applies on paper, net clamps to zero
        let b = calculate_earnings(Money::zero(), CommissionRate::from_bps(1500));
        assert_eq!(b.commission_cents, 0);
        assert_eq!(b.processing_fee_cents, PROCESSING_FEE_FLAT_CENTS);
        assert_eq!(b.net_cents, 0);
    }

    #[test]
    fn test_breakdown_identity() {
        // For orders big enough not to clamp:
        // gross == commission + processing + platform + net
        for gross in [1000_i64, 4000, 6000, 99_999, 1_234_567] {
            let b = calculate_earnings(Money::from_cents(gross), CommissionRate::from_bps(1500));
            assert_eq!(
                b.gross_cents,
                b.commission_cents + b.processing_fee_cents + b.platform_fee_cents + b.net_cents
            );
        }
    }

    #[test]
    fn test_commission_rounding_half_up() {
        // 3333 cents at 15% = 499.95 → 500
        let b = calculate_earnings(Money::from_cents(3333), CommissionRate::from_bps(1500));
        assert_eq!(b.commission_cents, 500);
        // 3333 at 2.9% = 96.657 → 97, +30 = 127
        assert_eq!(b.processing_fee_cents, 127);
    }

    #[test]
    fn test_zero_commission_rate() {
        let b = calculate_earnings(Money::from_cents(10_000), CommissionRate::zero());
        assert_eq!(b.commission_cents, 0);
        assert_eq!(b.processing_fee_cents, 320);
        assert_eq!(b.net_cents, 9680);
    }
}
