//! # Domain Types
//!
//! Core domain types for the Vendora settlement engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    SubOrder     │   │ EarningsRecord  │   │     Payout      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  order_id       │   │  seller_id      │   │  seller_id      │       │
//! │  │  seller_id      │   │  net_cents      │   │  amount_cents   │       │
//! │  │  subtotal_cents │   │  available_date │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CommissionRate  │   │ EarningsStatus  │   │  PayoutStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Pending        │   │  PendingApproval│       │
//! │  │  1500 = 15.00%  │   │  Available      │   │  Approved       │       │
//! │  └─────────────────┘   │  Processing     │   │  Processing     │       │
//! │                        │  Paid           │   │  Completed      │       │
//! │                        └─────────────────┘   │  Failed         │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ledger Discipline
//! `EarningsRecord` rows are never deleted, only transitioned forward and
//! eventually linked to a `Payout`. `Payout.amount_cents` is immutable after
//! insert; an adjustment is a new payout, not a mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::money::Money;

// =============================================================================
// Commission Rate
// =============================================================================

/// Commission rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000.
/// 1500 bps = 15.00% — the "two decimal places of a percentage" the
/// commission configuration carries, represented exactly in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// Creates a commission rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    /// Creates a commission rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        CommissionRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        CommissionRate(0)
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::zero()
    }
}

// =============================================================================
// Order Input
// =============================================================================

/// A line item of a paid order, as handed to the splitter.
///
/// Seller and category are NOT present here: they are resolved through the
/// catalog service, batched by distinct product id, at split time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Catalog product reference.
    pub product_id: String,

    /// Unit price in cents at the time the order was paid.
    pub unit_price_cents: i64,

    /// Quantity ordered.
    pub quantity: i64,
}

impl OrderLine {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Fulfillment Status
// =============================================================================

/// Fulfillment status of a sub-order.
///
/// Updated by an external fulfillment collaborator; independent of the payout
/// side. Delivery confirmation is what may promote earnings to `available`
/// ahead of the holding period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    /// Created at split time, seller not yet acting on it.
    Pending,
    /// Seller has started fulfillment.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Confirmed delivered.
    Delivered,
    /// Cancelled by seller or support.
    Cancelled,
}

impl Default for FulfillmentStatus {
    fn default() -> Self {
        FulfillmentStatus::Pending
    }
}

// =============================================================================
// Sub-Order
// =============================================================================

/// The portion of a multi-seller order belonging to one seller.
///
/// Created exactly once per (order, seller) pair at split time; the subtotal
/// is immutable after creation. Single-seller orders skip this row entirely
/// (the earnings record points straight at the parent order).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SubOrder {
    pub id: String,
    /// Parent order (external entity, referenced by id only).
    pub order_id: String,
    pub seller_id: String,
    /// Sum of line totals for this seller's items. Immutable.
    pub subtotal_cents: i64,
    /// Number of line items in this sub-order.
    pub item_count: i64,
    pub fulfillment_status: FulfillmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubOrder {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// A line item within a sub-order.
///
/// Uses the snapshot pattern: catalog data (sku, title, price) is frozen at
/// settlement time so later catalog edits never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SubOrderItem {
    pub id: String,
    pub sub_order_id: String,
    pub product_id: String,
    /// SKU at settlement time (frozen).
    pub sku_snapshot: String,
    /// Product title at settlement time (frozen).
    pub title_snapshot: String,
    /// Unit price in cents at settlement time (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Earnings Status
// =============================================================================

/// Status of an earnings ledger entry.
///
/// ## State Machine
/// ```text
/// pending ──────────────► processing ──► paid
///    │                        ▲
///    │ (delivery confirmed    │ (claimed by payout batch)
///    │  before holding        │
///    │  period elapses)       │
///    ▼                        │
/// available ──────────────────┘
/// ```
///
/// There is no `failed` earnings state: payout failures live on the `Payout`
/// and the scheduler reverts the affected rows back to `available`.
///
/// A row past its `available_date` while still `pending` is *eligible* by
/// date; eligibility is a query predicate, not a background status flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum EarningsStatus {
    /// Holding period running; eligible once `available_date` passes.
    Pending,
    /// Explicitly released for payout (e.g. delivery confirmed early).
    Available,
    /// Claimed by a payout batch; `payout_id` is attached.
    Processing,
    /// Disbursement confirmed.
    Paid,
}

impl EarningsStatus {
    /// Whether a transition to `next` is allowed.
    ///
    /// Re-applying the current status is an idempotent no-op, never an error.
    /// The one sanctioned backward move (`processing → available` when a
    /// payout fails) is a scheduler-owned revert and deliberately NOT
    /// representable here.
    pub fn can_transition_to(&self, next: EarningsStatus) -> bool {
        use EarningsStatus::*;
        match (self, next) {
            (a, b) if *a == b => true,
            (Pending, Available) | (Pending, Processing) => true,
            (Available, Processing) => true,
            (Processing, Paid) => true,
            _ => false,
        }
    }
}

impl Default for EarningsStatus {
    fn default() -> Self {
        EarningsStatus::Pending
    }
}

// =============================================================================
// Earnings Record
// =============================================================================

/// One seller's earnings from one order, net of commission and fees.
///
/// Created exactly once per (order, seller); never deleted. For single-seller
/// orders `sub_order_id` is `None` and the record points straight at the
/// parent order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EarningsRecord {
    pub id: String,
    pub seller_id: String,
    pub order_id: String,
    /// Absent for single-seller orders.
    pub sub_order_id: Option<String>,
    pub gross_cents: i64,
    /// Commission rate applied, in basis points (1500 = 15.00%).
    pub commission_rate_bps: u32,
    pub commission_cents: i64,
    pub processing_fee_cents: i64,
    pub platform_fee_cents: i64,
    /// max(0, gross − commission − processing_fee − platform_fee).
    pub net_cents: i64,
    pub status: EarningsStatus,
    /// End of the holding period; eligible for payout once this passes.
    pub available_date: DateTime<Utc>,
    /// Set when a payout batch claims this record. At most one, ever.
    pub payout_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EarningsRecord {
    /// Returns the net amount as Money.
    #[inline]
    pub fn net(&self) -> Money {
        Money::from_cents(self.net_cents)
    }

    /// Returns the gross amount as Money.
    #[inline]
    pub fn gross(&self) -> Money {
        Money::from_cents(self.gross_cents)
    }

    /// Payout eligibility predicate.
    ///
    /// `status = 'pending' AND available_date <= now` and
    /// `status = 'available'` are equally eligible; a record already claimed
    /// by a payout never is.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        if self.payout_id.is_some() {
            return false;
        }
        match self.status {
            EarningsStatus::Available => true,
            EarningsStatus::Pending => self.available_date <= now,
            _ => false,
        }
    }

    /// Internal consistency check: the displayed numbers must always add up.
    pub fn is_consistent(&self) -> bool {
        let expected = Money::from_cents(self.gross_cents).saturating_sub(Money::from_cents(
            self.commission_cents + self.processing_fee_cents + self.platform_fee_cents,
        ));
        self.net_cents == expected.cents() && self.net_cents >= 0
    }
}

// =============================================================================
// Payout
// =============================================================================

/// Disbursement method for a payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    BankTransfer,
    Paypal,
}

impl Default for PayoutMethod {
    fn default() -> Self {
        PayoutMethod::BankTransfer
    }
}

/// Status of a payout request.
///
/// ## State Machine
/// ```text
/// pending_approval ──► approved ──► processing ──► completed
///        (manual)         │                            │
///                         │                            ▼
///   (amount ≤ threshold:  │                         failed
///    created as approved) ┘              (earnings revert to available)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Over the auto-approve threshold; waiting for manual review.
    PendingApproval,
    /// Approved (automatically or manually), not yet disbursing.
    Approved,
    /// Disbursement in flight.
    Processing,
    /// Disbursement confirmed.
    Completed,
    /// Disbursement failed; see `failure_reason`.
    Failed,
}

impl PayoutStatus {
    /// Whether a transition to `next` is allowed.
    /// Re-applying the current status is an idempotent no-op.
    pub fn can_transition_to(&self, next: PayoutStatus) -> bool {
        use PayoutStatus::*;
        match (self, next) {
            (a, b) if *a == b => true,
            (PendingApproval, Approved) => true,
            (Approved, Processing) => true,
            (Processing, Completed) | (Processing, Failed) => true,
            _ => false,
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PayoutStatus::Completed | PayoutStatus::Failed)
    }
}

/// A batched disbursement request for one seller.
///
/// Aggregates one or more earnings records. `amount_cents` is immutable once
/// created; adjustments require a new payout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payout {
    pub id: String,
    pub seller_id: String,
    pub amount_cents: i64,
    pub method: PayoutMethod,
    pub status: PayoutStatus,
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
}

impl Payout {
    /// Returns the payout amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Configuration Types
// =============================================================================

/// Commission configuration, read fresh on every resolution.
///
/// Admins can change rates at runtime, so this snapshot is fetched per
/// operation from the settings repository and passed in explicitly - no
/// ambient global, no long-lived cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionSettings {
    pub id: String,
    /// Platform-wide default rate in basis points.
    pub default_rate_bps: u32,
    /// Category id → rate override (bps).
    pub category_rates: HashMap<String, u32>,
    /// Seller id → rate override (bps). Wins over everything.
    pub seller_rates: HashMap<String, u32>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// Payout batching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PayoutSettings {
    pub id: String,
    /// Master switch: when false the batch run is a no-op.
    pub auto_payout_enabled: bool,
    /// Sellers below this aggregate are skipped and keep accumulating.
    pub minimum_payout_cents: i64,
    /// At or below this amount a payout is created pre-approved;
    /// above it, it queues for manual review.
    pub auto_approve_threshold_cents: i64,
    /// Days between settlement and payout eligibility.
    pub holding_period_days: i64,
    /// Default disbursement method for scheduler-created payouts.
    pub method: PayoutMethod,
    pub updated_at: DateTime<Utc>,
}

impl PayoutSettings {
    /// Fallback used when no settings row exists.
    ///
    /// Settlement must stay available with absent configuration, so this
    /// never errors. `now` is passed in to keep the core clock-free.
    pub fn fallback(now: DateTime<Utc>) -> Self {
        PayoutSettings {
            id: "fallback".to_string(),
            auto_payout_enabled: true,
            minimum_payout_cents: 1000,
            auto_approve_threshold_cents: 10_000,
            holding_period_days: crate::DEFAULT_HOLDING_PERIOD_DAYS,
            method: PayoutMethod::default(),
            updated_at: now,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
