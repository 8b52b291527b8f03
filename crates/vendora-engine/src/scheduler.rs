//! # Payout Scheduler
//!
//! Aggregates eligible earnings into per-seller payouts and drives the payout
//! lifecycle to completion or failure.
//!
//! ## Batch Run
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  run_batch()                                                            │
//! │       │                                                                 │
//! │       ├── payout settings (fallback when absent); disabled → no-op     │
//! │       ├── aggregate pre-filter: sellers with eligible earnings          │
//! │       │                                                                 │
//! │       └── per seller, ONE transaction:                                 │
//! │             ├── re-read eligible records (authoritative sum)           │
//! │             ├── below minimum → skip, seller keeps accumulating        │
//! │             ├── insert payout                                          │
//! │             │     amount ≤ auto-approve threshold → approved           │
//! │             │     amount > threshold → pending_approval (manual queue) │
//! │             ├── claim each record (guarded UPDATE, eligibility in the  │
//! │             │     WHERE clause)                                        │
//! │             └── any claim misses → ROLLBACK, the seller is retried     │
//! │                   next run; a record is never on two payouts           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Handling
//! A failed disbursement reverts its records to `available` and detaches
//! them, so the next batch run picks them up on a fresh payout. The failed
//! payout row stays behind as the audit trail.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::gateway::{NotificationGateway, PayoutNotice};
use vendora_core::{CoreError, Money, Payout, PayoutSettings, PayoutStatus};
use vendora_db::repository::payout::generate_payout_id;
use vendora_db::{Database, EarningsRepository, PayoutRepository};

/// Outcome of one batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// False when the master switch was off and nothing ran.
    pub enabled: bool,
    /// Payouts created this run.
    pub payouts: Vec<Payout>,
    /// Sellers whose eligible total was below the minimum.
    pub sellers_below_minimum: usize,
    /// Sellers skipped because a concurrent run claimed their records first.
    pub sellers_contended: usize,
}

impl BatchOutcome {
    fn disabled() -> Self {
        BatchOutcome {
            enabled: false,
            payouts: Vec::new(),
            sellers_below_minimum: 0,
            sellers_contended: 0,
        }
    }
}

fn status_name(status: PayoutStatus) -> &'static str {
    match status {
        PayoutStatus::PendingApproval => "pending_approval",
        PayoutStatus::Approved => "approved",
        PayoutStatus::Processing => "processing",
        PayoutStatus::Completed => "completed",
        PayoutStatus::Failed => "failed",
    }
}

fn invalid_transition(payout: &Payout, to: PayoutStatus) -> EngineError {
    EngineError::Core(CoreError::InvalidTransition {
        entity: "Payout",
        id: payout.id.clone(),
        from: status_name(payout.status).to_string(),
        to: status_name(to).to_string(),
    })
}

/// Creates payouts from eligible earnings and drives their lifecycle.
pub struct PayoutScheduler {
    db: Database,
    gateway: Arc<dyn NotificationGateway>,
}

impl PayoutScheduler {
    /// Creates a new PayoutScheduler.
    pub fn new(db: Database, gateway: Arc<dyn NotificationGateway>) -> Self {
        PayoutScheduler { db, gateway }
    }

    /// Runs one payout batch over all sellers with eligible earnings.
    ///
    /// Idempotent per ledger state: a second run right after the first finds
    /// nothing eligible and creates nothing.
    pub async fn run_batch(&self) -> EngineResult<BatchOutcome> {
        let now = Utc::now();
        let settings = self
            .db
            .settings()
            .payout()
            .await?
            .unwrap_or_else(|| PayoutSettings::fallback(now));

        if !settings.auto_payout_enabled {
            info!("Automatic payouts disabled; batch is a no-op");
            return Ok(BatchOutcome::disabled());
        }

        let candidates = self.db.earnings().eligible_sellers(now).await?;
        info!(candidates = candidates.len(), "Payout batch started");

        let mut outcome = BatchOutcome {
            enabled: true,
            payouts: Vec::new(),
            sellers_below_minimum: 0,
            sellers_contended: 0,
        };

        for candidate in candidates {
            if candidate.total_net_cents < settings.minimum_payout_cents {
                debug!(
                    seller_id = %candidate.seller_id,
                    total_net_cents = candidate.total_net_cents,
                    minimum = settings.minimum_payout_cents,
                    "Below payout minimum, accumulating"
                );
                outcome.sellers_below_minimum += 1;
                continue;
            }

            match self
                .try_payout_seller(&candidate.seller_id, &settings, now)
                .await
            {
                Ok(Some(payout)) => outcome.payouts.push(payout),
                // The eligible set shrank between pre-filter and claim read
                Ok(None) => outcome.sellers_below_minimum += 1,
                Err(EngineError::ClaimContention { seller_id }) => {
                    warn!(seller_id = %seller_id, "Claim race lost, seller deferred to next run");
                    outcome.sellers_contended += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            payouts = outcome.payouts.len(),
            below_minimum = outcome.sellers_below_minimum,
            contended = outcome.sellers_contended,
            "Payout batch finished"
        );

        Ok(outcome)
    }

    /// Creates a payout for one seller on demand (support surface). Honors
    /// the minimum and approval threshold but not the batch master switch.
    pub async fn payout_seller(&self, seller_id: &str) -> EngineResult<Option<Payout>> {
        let now = Utc::now();
        let settings = self
            .db
            .settings()
            .payout()
            .await?
            .unwrap_or_else(|| PayoutSettings::fallback(now));
        self.try_payout_seller(seller_id, &settings, now).await
    }

    /// Claims one seller's eligible earnings onto a fresh payout, all inside
    /// one transaction. `Ok(None)` when the seller has nothing (or too
    /// little) to pay out.
    async fn try_payout_seller(
        &self,
        seller_id: &str,
        settings: &PayoutSettings,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<Payout>> {
        let mut tx = self.db.pool().begin().await?;

        let records = EarningsRepository::eligible_for_seller(&mut tx, seller_id, now).await?;
        let total: Money = records.iter().map(|r| r.net()).sum();
        if records.is_empty() || total.cents() < settings.minimum_payout_cents {
            tx.rollback().await?;
            return Ok(None);
        }

        let auto_approved = total.cents() <= settings.auto_approve_threshold_cents;
        let payout = Payout {
            id: generate_payout_id(),
            seller_id: seller_id.to_string(),
            amount_cents: total.cents(),
            method: settings.method,
            status: if auto_approved {
                PayoutStatus::Approved
            } else {
                PayoutStatus::PendingApproval
            },
            requested_at: now,
            approved_at: auto_approved.then_some(now),
            processed_at: None,
            completed_at: None,
            failed_at: None,
            failure_reason: None,
        };
        PayoutRepository::insert(&mut tx, &payout).await?;

        let mut claimed = 0_u64;
        for record in &records {
            claimed +=
                EarningsRepository::claim_for_payout(&mut tx, &record.id, &payout.id, now).await?;
        }
        if claimed != records.len() as u64 {
            tx.rollback().await?;
            return Err(EngineError::ClaimContention {
                seller_id: seller_id.to_string(),
            });
        }

        tx.commit().await?;

        debug!(
            seller_id,
            payout_id = %payout.id,
            amount_cents = payout.amount_cents,
            records = records.len(),
            auto_approved,
            "Payout created"
        );

        let notice = PayoutNotice {
            seller_id: seller_id.to_string(),
            payout_id: payout.id.clone(),
            amount_cents: payout.amount_cents,
            requires_approval: !auto_approved,
        };
        if let Err(e) = self.gateway.payout_created(&notice).await {
            warn!(payout_id = %payout.id, error = %e, "Payout notification failed");
        }

        Ok(Some(payout))
    }

    /// Manually approves a payout queued for review. Idempotent on an
    /// already-approved payout.
    pub async fn approve(&self, payout_id: &str) -> EngineResult<Payout> {
        let payout = self.fetch(payout_id).await?;
        if payout.status == PayoutStatus::Approved {
            return Ok(payout);
        }
        if !payout.status.can_transition_to(PayoutStatus::Approved) {
            return Err(invalid_transition(&payout, PayoutStatus::Approved));
        }

        let updated = self.db.payouts().set_approved(payout_id, Utc::now()).await?;
        if updated == 0 {
            // Lost a race; judge the fresh state
            let fresh = self.fetch(payout_id).await?;
            if fresh.status == PayoutStatus::Approved {
                return Ok(fresh);
            }
            return Err(invalid_transition(&fresh, PayoutStatus::Approved));
        }

        info!(payout_id, "Payout approved");
        self.fetch(payout_id).await
    }

    /// Marks an approved payout as disbursing.
    pub async fn mark_processing(&self, payout_id: &str) -> EngineResult<Payout> {
        let payout = self.fetch(payout_id).await?;
        if payout.status == PayoutStatus::Processing {
            return Ok(payout);
        }
        if !payout.status.can_transition_to(PayoutStatus::Processing) {
            return Err(invalid_transition(&payout, PayoutStatus::Processing));
        }

        let updated = self
            .db
            .payouts()
            .set_processing(payout_id, Utc::now())
            .await?;
        if updated == 0 {
            let fresh = self.fetch(payout_id).await?;
            if fresh.status == PayoutStatus::Processing {
                return Ok(fresh);
            }
            return Err(invalid_transition(&fresh, PayoutStatus::Processing));
        }

        info!(payout_id, "Payout disbursement started");
        self.fetch(payout_id).await
    }

    /// Confirms disbursement: the payout completes and every attached
    /// earnings record flips to `paid`, in one transaction.
    pub async fn complete(&self, payout_id: &str) -> EngineResult<Payout> {
        let payout = self.fetch(payout_id).await?;
        if payout.status == PayoutStatus::Completed {
            return Ok(payout);
        }
        if !payout.status.can_transition_to(PayoutStatus::Completed) {
            return Err(invalid_transition(&payout, PayoutStatus::Completed));
        }

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        let updated = PayoutRepository::set_completed(&mut tx, payout_id, now).await?;
        if updated == 0 {
            tx.rollback().await?;
            let fresh = self.fetch(payout_id).await?;
            if fresh.status == PayoutStatus::Completed {
                return Ok(fresh);
            }
            return Err(invalid_transition(&fresh, PayoutStatus::Completed));
        }
        let paid = EarningsRepository::mark_paid_for_payout(&mut tx, payout_id, now).await?;
        tx.commit().await?;

        info!(payout_id, records_paid = paid, "Payout completed");
        self.fetch(payout_id).await
    }

    /// Records a failed disbursement: the payout fails with a reason and its
    /// records revert to `available`, detached, so the next batch retries
    /// them on a fresh payout.
    pub async fn fail(&self, payout_id: &str, reason: &str) -> EngineResult<Payout> {
        let payout = self.fetch(payout_id).await?;
        if payout.status == PayoutStatus::Failed {
            return Ok(payout);
        }
        if !payout.status.can_transition_to(PayoutStatus::Failed) {
            return Err(invalid_transition(&payout, PayoutStatus::Failed));
        }

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        let updated = PayoutRepository::set_failed(&mut tx, payout_id, reason, now).await?;
        if updated == 0 {
            tx.rollback().await?;
            let fresh = self.fetch(payout_id).await?;
            if fresh.status == PayoutStatus::Failed {
                return Ok(fresh);
            }
            return Err(invalid_transition(&fresh, PayoutStatus::Failed));
        }
        let reverted = EarningsRepository::revert_for_payout(&mut tx, payout_id, now).await?;
        tx.commit().await?;

        warn!(
            payout_id,
            reason,
            records_reverted = reverted,
            "Payout failed, earnings released for retry"
        );
        self.fetch(payout_id).await
    }

    async fn fetch(&self, payout_id: &str) -> EngineResult<Payout> {
        self.db
            .payouts()
            .get_by_id(payout_id)
            .await?
            .ok_or_else(|| EngineError::PayoutNotFound {
                payout_id: payout_id.to_string(),
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
