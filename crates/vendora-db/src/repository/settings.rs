//! # Settings Repository
//!
//! Commission and payout configuration, admin-mutated at runtime.
//!
//! The engine reads these fresh on every operation (no caching): an admin
//! rate change must apply to the next order settled, not after a restart.
//! Writes happen through an administrative surface outside this engine; the
//! upserts below exist for that surface and for test fixtures.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::error::{DbError, DbResult};
use vendora_core::{CommissionSettings, PayoutSettings};

/// Raw commission row; rate maps are JSON TEXT columns.
#[derive(Debug, sqlx::FromRow)]
struct CommissionSettingsRow {
    id: String,
    default_rate_bps: u32,
    category_rates: String,
    seller_rates: String,
    is_active: bool,
    updated_at: DateTime<Utc>,
}

impl CommissionSettingsRow {
    fn decode(self) -> DbResult<CommissionSettings> {
        let category_rates: HashMap<String, u32> = serde_json::from_str(&self.category_rates)
            .map_err(|e| DbError::CorruptData {
                entity: "commission_settings.category_rates".to_string(),
                message: e.to_string(),
            })?;
        let seller_rates: HashMap<String, u32> = serde_json::from_str(&self.seller_rates)
            .map_err(|e| DbError::CorruptData {
                entity: "commission_settings.seller_rates".to_string(),
                message: e.to_string(),
            })?;

        Ok(CommissionSettings {
            id: self.id,
            default_rate_bps: self.default_rate_bps,
            category_rates,
            seller_rates,
            is_active: self.is_active,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for configuration rows.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Returns the active commission settings, or `None` when absent.
    ///
    /// `None` is not an error: the resolver falls back to the hard default.
    pub async fn commission(&self) -> DbResult<Option<CommissionSettings>> {
        let row = sqlx::query_as::<_, CommissionSettingsRow>(
            r#"
            SELECT id, default_rate_bps, category_rates, seller_rates,
                   is_active, updated_at
            FROM commission_settings
            WHERE is_active = 1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(CommissionSettingsRow::decode).transpose()
    }

    /// Returns the payout settings, or `None` when absent.
    pub async fn payout(&self) -> DbResult<Option<PayoutSettings>> {
        let settings = sqlx::query_as::<_, PayoutSettings>(
            r#"
            SELECT id, auto_payout_enabled, minimum_payout_cents,
                   auto_approve_threshold_cents, holding_period_days,
                   method, updated_at
            FROM payout_settings
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Upserts commission settings (admin surface / test fixtures).
    pub async fn upsert_commission(&self, settings: &CommissionSettings) -> DbResult<()> {
        let category_rates = serde_json::to_string(&settings.category_rates)
            .map_err(|e| DbError::Internal(e.to_string()))?;
        let seller_rates = serde_json::to_string(&settings.seller_rates)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO commission_settings (
                id, default_rate_bps, category_rates, seller_rates,
                is_active, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (id) DO UPDATE SET
                default_rate_bps = excluded.default_rate_bps,
                category_rates = excluded.category_rates,
                seller_rates = excluded.seller_rates,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&settings.id)
        .bind(settings.default_rate_bps)
        .bind(category_rates)
        .bind(seller_rates)
        .bind(settings.is_active)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Upserts payout settings (admin surface / test fixtures).
    pub async fn upsert_payout(&self, settings: &PayoutSettings) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payout_settings (
                id, auto_payout_enabled, minimum_payout_cents,
                auto_approve_threshold_cents, holding_period_days,
                method, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id) DO UPDATE SET
                auto_payout_enabled = excluded.auto_payout_enabled,
                minimum_payout_cents = excluded.minimum_payout_cents,
                auto_approve_threshold_cents = excluded.auto_approve_threshold_cents,
                holding_period_days = excluded.holding_period_days,
                method = excluded.method,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&settings.id)
        .bind(settings.auto_payout_enabled)
        .bind(settings.minimum_payout_cents)
        .bind(settings.auto_approve_threshold_cents)
        .bind(settings.holding_period_days)
        .bind(settings.method)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vendora_core::PayoutMethod;

    #[tokio::test]
    async fn test_absent_settings_are_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.settings().commission().await.unwrap().is_none());
        assert!(db.settings().payout().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commission_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        let mut category_rates = HashMap::new();
        category_rates.insert("electronics".to_string(), 2000_u32);
        let mut seller_rates = HashMap::new();
        seller_rates.insert("seller-vip".to_string(), 1000_u32);

        let settings = CommissionSettings {
            id: "default".to_string(),
            default_rate_bps: 1500,
            category_rates,
            seller_rates,
            is_active: true,
            updated_at: Utc::now(),
        };
        repo.upsert_commission(&settings).await.unwrap();

        let fetched = repo.commission().await.unwrap().unwrap();
        assert_eq!(fetched.default_rate_bps, 1500);
        assert_eq!(fetched.category_rates.get("electronics"), Some(&2000));
        assert_eq!(fetched.seller_rates.get("seller-vip"), Some(&1000));
    }

    #[tokio::test]
    async fn test_inactive_commission_is_invisible() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        let settings = CommissionSettings {
            id: "default".to_string(),
            default_rate_bps: 1200,
            category_rates: HashMap::new(),
            seller_rates: HashMap::new(),
            is_active: false,
            updated_at: Utc::now(),
        };
        repo.upsert_commission(&settings).await.unwrap();

        assert!(repo.commission().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_payout_roundtrip_and_update() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        let mut settings = PayoutSettings {
            id: "default".to_string(),
            auto_payout_enabled: true,
            minimum_payout_cents: 2000,
            auto_approve_threshold_cents: 5000,
            holding_period_days: 7,
            method: PayoutMethod::BankTransfer,
            updated_at: Utc::now(),
        };
        repo.upsert_payout(&settings).await.unwrap();

        let fetched = repo.payout().await.unwrap().unwrap();
        assert_eq!(fetched.minimum_payout_cents, 2000);
        assert!(fetched.auto_payout_enabled);

        // Admin flips the master switch at runtime
        settings.auto_payout_enabled = false;
        settings.updated_at = Utc::now();
        repo.upsert_payout(&settings).await.unwrap();

        let fetched = repo.payout().await.unwrap().unwrap();
        assert!(!fetched.auto_payout_enabled);
    }
}
