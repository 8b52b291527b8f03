//! # Notification Gateway
//!
//! Outbound notification boundary: sellers hear about settled earnings and
//! requested payouts through here.
//!
//! Strictly fire-and-forget. Notifications go out AFTER the owning
//! transaction commits, and a delivery failure is logged and swallowed - the
//! ledger never rolls back because an email bounced.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Payload for "your earnings from an order have been settled".
#[derive(Debug, Clone, Serialize)]
pub struct SettlementNotice {
    pub seller_id: String,
    pub order_id: String,
    /// Absent for single-seller orders (no sub-order row exists).
    pub sub_order_id: Option<String>,
    pub item_count: i64,
    pub gross_cents: i64,
    pub net_cents: i64,
}

/// Payload for "a payout has been created for you".
#[derive(Debug, Clone, Serialize)]
pub struct PayoutNotice {
    pub seller_id: String,
    pub payout_id: String,
    pub amount_cents: i64,
    /// True when the payout exceeded the auto-approve threshold and is
    /// queued for manual review.
    pub requires_approval: bool,
}

/// Notification delivery failures. Logged by the caller, never propagated.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Outbound seller notification channel.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// One order's earnings were settled for this seller.
    async fn settlement_created(&self, notice: &SettlementNotice) -> Result<(), GatewayError>;

    /// A payout was created for this seller.
    async fn payout_created(&self, notice: &PayoutNotice) -> Result<(), GatewayError>;
}

/// Gateway that drops every notification. Useful for batch backfills and
/// environments without a delivery channel configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGateway;

#[async_trait]
impl NotificationGateway for NoopGateway {
    async fn settlement_created(&self, _notice: &SettlementNotice) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn payout_created(&self, _notice: &PayoutNotice) -> Result<(), GatewayError> {
        Ok(())
    }
}
