//! # Commission Resolver
//!
//! Resolves the applicable commission rate for a (seller, category) pair.
//!
//! ## Precedence (first match wins)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. seller_rates[seller_id]        seller-specific override             │
//! │  2. category_rates[category_id]    only if the category is known        │
//! │  3. default_rate_bps               platform-wide default                │
//! │  4. 15.00% hard fallback           no active settings row at all        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The resolver never errors: order settlement must stay available even when
//! configuration is absent. The trade-off (a silent fallback can mask
//! misconfiguration) is accepted; the splitter logs the resolved rate per
//! seller group so operators can spot it.

use crate::types::{CommissionRate, CommissionSettings};

/// Hard fallback rate when no active commission settings exist: 15.00%.
pub const FALLBACK_COMMISSION_BPS: u32 = 1500;

/// Resolves the commission rate for a seller and (optional) category.
///
/// Pure function over a settings snapshot. The snapshot must be read fresh
/// per operation - admins change rates at runtime - which is why this takes
/// the settings as an argument instead of holding a cached copy.
///
/// ## Example
/// ```rust
/// use vendora_core::commission::resolve_commission_rate;
///
/// // No configuration at all: hard 15.00% fallback
/// let rate = resolve_commission_rate(None, "seller-1", None);
/// assert_eq!(rate.bps(), 1500);
/// ```
pub fn resolve_commission_rate(
    settings: Option<&CommissionSettings>,
    seller_id: &str,
    category_id: Option<&str>,
) -> CommissionRate {
    let Some(settings) = settings.filter(|s| s.is_active) else {
        return CommissionRate::from_bps(FALLBACK_COMMISSION_BPS);
    };

    if let Some(&bps) = settings.seller_rates.get(seller_id) {
        return CommissionRate::from_bps(bps);
    }

    if let Some(category_id) = category_id {
        if let Some(&bps) = settings.category_rates.get(category_id) {
            return CommissionRate::from_bps(bps);
        }
    }

    CommissionRate::from_bps(settings.default_rate_bps)
}

// =============================================================================
// Unit Tests
// =============================================================================
