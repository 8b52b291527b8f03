//! # Payout Repository
//!
//! Database operations for payout disbursement requests.
//!
//! ## Payout Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CREATE (scheduler, inside the per-seller claim transaction)        │
//! │     └── insert() → status approved | pending_approval                  │
//! │         amount_cents is immutable from here on                         │
//! │                                                                         │
//! │  2. LIFECYCLE (guarded conditional updates, rows_affected checked)     │
//! │     └── set_approved()   pending_approval → approved                   │
//! │     └── set_processing() approved → processing                         │
//! │     └── set_completed()  processing → completed (earnings → paid)      │
//! │     └── set_failed()     processing → failed   (earnings revert)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition UPDATE carries its source status in the WHERE clause, so
//! a lost race shows up as zero rows affected instead of a silent overwrite.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use vendora_core::Payout;

/// Repository for payout database operations.
#[derive(Debug, Clone)]
pub struct PayoutRepository {
    pool: SqlitePool,
}

impl PayoutRepository {
    /// Creates a new PayoutRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PayoutRepository { pool }
    }

    /// Inserts a payout inside the caller's claim transaction.
    pub async fn insert(conn: &mut SqliteConnection, payout: &Payout) -> DbResult<()> {
        debug!(
            id = %payout.id,
            seller_id = %payout.seller_id,
            amount_cents = payout.amount_cents,
            status = ?payout.status,
            "Inserting payout"
        );

        sqlx::query(
            r#"
            INSERT INTO payouts (
                id, seller_id, amount_cents, method, status,
                requested_at, approved_at, processed_at, completed_at,
                failed_at, failure_reason
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&payout.id)
        .bind(&payout.seller_id)
        .bind(payout.amount_cents)
        .bind(payout.method)
        .bind(payout.status)
        .bind(payout.requested_at)
        .bind(payout.approved_at)
        .bind(payout.processed_at)
        .bind(payout.completed_at)
        .bind(payout.failed_at)
        .bind(&payout.failure_reason)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets a payout by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payout>> {
        let payout = sqlx::query_as::<_, Payout>("SELECT * FROM payouts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payout)
    }

    /// Lists a seller's payouts, newest first.
    pub async fn list_for_seller(&self, seller_id: &str) -> DbResult<Vec<Payout>> {
        let payouts = sqlx::query_as::<_, Payout>(
            "SELECT * FROM payouts WHERE seller_id = ?1 ORDER BY requested_at DESC",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payouts)
    }

    /// Payouts waiting for manual review, oldest first.
    pub async fn list_pending_approval(&self) -> DbResult<Vec<Payout>> {
        let payouts = sqlx::query_as::<_, Payout>(
            "SELECT * FROM payouts WHERE status = 'pending_approval' ORDER BY requested_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(payouts)
    }

    /// `pending_approval → approved`. Returns rows affected (0 on a lost
    /// race or wrong source status).
    pub async fn set_approved(&self, id: &str, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE payouts SET status = 'approved', approved_at = ?2
            WHERE id = ?1 AND status = 'pending_approval'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// `approved → processing`.
    pub async fn set_processing(&self, id: &str, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE payouts SET status = 'processing', processed_at = ?2
            WHERE id = ?1 AND status = 'approved'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// `processing → completed`, inside the caller's transaction (the same
    /// one that marks the attached earnings as paid).
    pub async fn set_completed(
        conn: &mut SqliteConnection,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE payouts SET status = 'completed', completed_at = ?2
            WHERE id = ?1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// `processing → failed`, inside the caller's transaction (the same one
    /// that reverts the attached earnings).
    pub async fn set_failed(
        conn: &mut SqliteConnection,
        id: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE payouts SET status = 'failed', failed_at = ?2, failure_reason = ?3
            WHERE id = ?1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(reason)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Generates a new payout ID.
pub fn generate_payout_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
