//! # Earnings Ledger Repository
//!
//! The durable record of seller earnings and its state machine.
//!
//! ## Eligibility Is A Predicate, Not A Cron Job
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A record is payout-eligible when:                                      │
//! │                                                                         │
//! │    payout_id IS NULL                                                    │
//! │    AND ( status = 'available'                                           │
//! │          OR (status = 'pending' AND available_date <= now) )            │
//! │                                                                         │
//! │  No background job flips pending → available when the holding period    │
//! │  elapses; the scheduler's queries and the claim UPDATE both carry this  │
//! │  predicate, so "pending past its date" and "available" are equally     │
//! │  eligible and the claim stays atomic.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use vendora_core::EarningsRecord;

/// Shared SQL fragment for the eligibility predicate.
/// Callers bind `now` for the `?` placeholder.
const ELIGIBLE_PREDICATE: &str =
    "payout_id IS NULL AND (status = 'available' OR (status = 'pending' AND available_date <= ?))";

/// Per-seller aggregate of eligible earnings.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SellerAggregate {
    pub seller_id: String,
    pub total_net_cents: i64,
    pub record_count: i64,
}

/// Reporting totals for one seller's ledger.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SellerEarningsSummary {
    /// Still inside the holding period.
    pub held_cents: i64,
    /// Eligible for the next payout batch.
    pub eligible_cents: i64,
    /// Claimed by an in-flight payout.
    pub processing_cents: i64,
    /// Disbursed.
    pub paid_cents: i64,
}

/// Repository for earnings ledger operations.
#[derive(Debug, Clone)]
pub struct EarningsRepository {
    pool: SqlitePool,
}

impl EarningsRepository {
    /// Creates a new EarningsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EarningsRepository { pool }
    }

    /// Inserts a ledger entry inside the caller's split transaction.
    pub async fn insert(conn: &mut SqliteConnection, record: &EarningsRecord) -> DbResult<()> {
        debug!(
            id = %record.id,
            seller_id = %record.seller_id,
            order_id = %record.order_id,
            net_cents = record.net_cents,
            "Inserting earnings record"
        );

        sqlx::query(
            r#"
            INSERT INTO earnings_records (
                id, seller_id, order_id, sub_order_id,
                gross_cents, commission_rate_bps, commission_cents,
                processing_fee_cents, platform_fee_cents, net_cents,
                status, available_date, payout_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&record.id)
        .bind(&record.seller_id)
        .bind(&record.order_id)
        .bind(&record.sub_order_id)
        .bind(record.gross_cents)
        .bind(record.commission_rate_bps)
        .bind(record.commission_cents)
        .bind(record.processing_fee_cents)
        .bind(record.platform_fee_cents)
        .bind(record.net_cents)
        .bind(record.status)
        .bind(record.available_date)
        .bind(&record.payout_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets a ledger entry by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<EarningsRecord>> {
        let record = sqlx::query_as::<_, EarningsRecord>(
            "SELECT * FROM earnings_records WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets all ledger entries of a parent order (idempotency probe +
    /// split result reconstruction).
    pub async fn get_by_order(&self, order_id: &str) -> DbResult<Vec<EarningsRecord>> {
        let records = sqlx::query_as::<_, EarningsRecord>(
            "SELECT * FROM earnings_records WHERE order_id = ?1 ORDER BY seller_id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Gets all ledger entries attached to a payout.
    pub async fn get_by_payout(&self, payout_id: &str) -> DbResult<Vec<EarningsRecord>> {
        let records = sqlx::query_as::<_, EarningsRecord>(
            "SELECT * FROM earnings_records WHERE payout_id = ?1 ORDER BY created_at",
        )
        .bind(payout_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Sellers with eligible earnings, with their aggregate net totals.
    ///
    /// Pre-filter for the payout batch; the authoritative sum is re-read
    /// inside each seller's claim transaction.
    pub async fn eligible_sellers(&self, now: DateTime<Utc>) -> DbResult<Vec<SellerAggregate>> {
        let sql = format!(
            "SELECT seller_id, \
                    COALESCE(SUM(net_cents), 0) AS total_net_cents, \
                    COUNT(*) AS record_count \
             FROM earnings_records \
             WHERE {ELIGIBLE_PREDICATE} \
             GROUP BY seller_id \
             ORDER BY seller_id"
        );

        let aggregates = sqlx::query_as::<_, SellerAggregate>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        Ok(aggregates)
    }

    /// Eligible ledger entries for one seller, read inside the claim
    /// transaction.
    pub async fn eligible_for_seller(
        conn: &mut SqliteConnection,
        seller_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<EarningsRecord>> {
        let sql = format!(
            "SELECT * FROM earnings_records \
             WHERE seller_id = ? AND {ELIGIBLE_PREDICATE} \
             ORDER BY created_at"
        );

        let records = sqlx::query_as::<_, EarningsRecord>(&sql)
            .bind(seller_id)
            .bind(now)
            .fetch_all(conn)
            .await?;

        Ok(records)
    }

    /// Claims one eligible record for a payout: flips it to `processing`
    /// and attaches the payout id, guarded by the eligibility predicate.
    ///
    /// Returns the number of rows claimed (0 or 1). A zero from a record
    /// the caller just read means another batch run claimed it first; the
    /// caller must roll back its payout.
    pub async fn claim_for_payout(
        conn: &mut SqliteConnection,
        record_id: &str,
        payout_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        let sql = format!(
            "UPDATE earnings_records \
             SET status = 'processing', payout_id = ?, updated_at = ? \
             WHERE id = ? AND {ELIGIBLE_PREDICATE}"
        );

        let result = sqlx::query(&sql)
            .bind(payout_id)
            .bind(now)
            .bind(record_id)
            .bind(now)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Marks all records of a completed payout as `paid`.
    pub async fn mark_paid_for_payout(
        conn: &mut SqliteConnection,
        payout_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE earnings_records
            SET status = 'paid', updated_at = ?2
            WHERE payout_id = ?1 AND status = 'processing'
            "#,
        )
        .bind(payout_id)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Reverts all records of a failed payout back to `available` and
    /// detaches them, so the next batch run retries them.
    ///
    /// The single sanctioned backward move in the ledger state machine.
    pub async fn revert_for_payout(
        conn: &mut SqliteConnection,
        payout_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE earnings_records
            SET status = 'available', payout_id = NULL, updated_at = ?2
            WHERE payout_id = ?1 AND status = 'processing'
            "#,
        )
        .bind(payout_id)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Promotes a sub-order's earnings to `available` ahead of the holding
    /// period (delivery confirmed). Forward-only and idempotent: records
    /// already past `pending` are untouched, zero rows affected is success.
    pub async fn release_for_sub_order(
        &self,
        sub_order_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE earnings_records
            SET status = 'available', updated_at = ?2
            WHERE sub_order_id = ?1 AND status = 'pending'
            "#,
        )
        .bind(sub_order_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Same promotion keyed by parent order id, for single-seller orders
    /// that have no sub-order row.
    ///
    /// The `sub_order_id IS NULL` guard keeps this strictly the
    /// single-seller path: on a multi-seller order each seller's record is
    /// released by its own sub-order's delivery, never wholesale.
    pub async fn release_for_order(&self, order_id: &str, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE earnings_records
            SET status = 'available', updated_at = ?2
            WHERE order_id = ?1 AND sub_order_id IS NULL AND status = 'pending'
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Reporting totals for one seller (read-only dashboard/analytics feed).
    pub async fn seller_summary(
        &self,
        seller_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<SellerEarningsSummary> {
        let summary = sqlx::query_as::<_, SellerEarningsSummary>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'pending' AND available_date > ?2
                                  THEN net_cents ELSE 0 END), 0) AS held_cents,
                COALESCE(SUM(CASE WHEN payout_id IS NULL
                                   AND (status = 'available'
                                        OR (status = 'pending' AND available_date <= ?2))
                                  THEN net_cents ELSE 0 END), 0) AS eligible_cents,
                COALESCE(SUM(CASE WHEN status = 'processing'
                                  THEN net_cents ELSE 0 END), 0) AS processing_cents,
                COALESCE(SUM(CASE WHEN status = 'paid'
                                  THEN net_cents ELSE 0 END), 0) AS paid_cents
            FROM earnings_records
            WHERE seller_id = ?1
            "#,
        )
        .bind(seller_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

/// Generates a new earnings record ID.
pub fn generate_earnings_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
