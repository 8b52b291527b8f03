//! # vendora-core: Pure Business Logic for Vendora
//!
//! This crate is the **heart** of the Vendora settlement engine. It contains
//! all business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Vendora Settlement Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Order Pipeline (external caller)                   │   │
//! │  │      payment captured ──► split order / run payout batch        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vendora-engine                               │   │
//! │  │      OrderSplitter, PayoutScheduler, external seams             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vendora-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ commission │  │ earnings  │  │   │
//! │  │   │  SubOrder │  │   Money   │  │  resolver  │  │ calculator│  │   │
//! │  │   │  Earnings │  │  rounding │  │ precedence │  │ fees, net │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vendora-db (SQLite ledger)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (SubOrder, EarningsRecord, Payout, settings)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`commission`] - Commission rate resolution with precedence
//! - [`earnings`] - Fee composition and net earnings calculation
//! - [`error`] - Domain error types
//! - [`validation`] - Order line validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic - callers pass `now`
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use vendora_core::commission::resolve_commission_rate;
//! use vendora_core::earnings::calculate_earnings;
//! use vendora_core::money::Money;
//!
//! // No configuration: the resolver falls back to 15.00%, never errors
//! let rate = resolve_commission_rate(None, "seller-1", None);
//!
//! let breakdown = calculate_earnings(Money::from_cents(6000), rate);
//! assert_eq!(breakdown.net_cents, 4896);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commission;
pub mod earnings;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vendora_core::Money` instead of
// `use vendora_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default holding period between settlement and payout eligibility, in days.
///
/// ## Why a constant?
/// The holding period normally comes from payout settings; when no settings
/// row exists the engine must still settle orders, so this is the fallback
/// baked into `PayoutSettings::fallback`.
pub const DEFAULT_HOLDING_PERIOD_DAYS: i64 = 7;

/// Maximum line items accepted in a single order split.
///
/// ## Business Reason
/// Bounds the per-order transaction size; anything larger is almost
/// certainly a malformed upstream payload.
pub const MAX_ORDER_LINES: usize = 500;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 10000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;
