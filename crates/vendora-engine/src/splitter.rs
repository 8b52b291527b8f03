//! # Order Splitter
//!
//! Splits a paid order into per-seller settlements: sub-orders for
//! multi-seller orders, plus one earnings ledger entry per seller either way.
//!
//! ## Split Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  split(order_id, lines)                                                 │
//! │       │                                                                 │
//! │       ├── 1. validate lines (empty order, bounds, negative prices)     │
//! │       ├── 2. idempotency probe: earnings for this order already exist? │
//! │       │      → return the existing rows, write nothing                 │
//! │       ├── 3. resolve distinct product ids through the catalog (one     │
//! │       │      batched call); unknown products are skipped with a        │
//! │       │      warning                                                   │
//! │       ├── 4. group lines by seller (ordered, so output and ids are     │
//! │       │      deterministic per run)                                    │
//! │       ├── 5. read commission + payout settings fresh                   │
//! │       ├── 6. ONE transaction:                                          │
//! │       │        single seller → one earnings record, NO sub-order       │
//! │       │        multi seller  → per seller: sub-order + item snapshots  │
//! │       │                        + earnings record                       │
//! │       └── 7. commit, then notify each seller (fire-and-forget)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UNIQUE(order_id, seller_id) constraints back the idempotency probe:
//! even if two split calls race past step 2, exactly one transaction commits.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogService, ResolvedProduct};
use crate::error::EngineResult;
use crate::gateway::{NotificationGateway, SettlementNotice};
use vendora_core::commission::resolve_commission_rate;
use vendora_core::earnings::calculate_earnings;
use vendora_core::validation::validate_order_lines;
use vendora_core::{
    EarningsRecord, EarningsStatus, FulfillmentStatus, Money, OrderLine, PayoutSettings, SubOrder,
    SubOrderItem,
};
use vendora_db::repository::earnings::generate_earnings_id;
use vendora_db::repository::sub_order::{generate_sub_order_id, generate_sub_order_item_id};
use vendora_db::{Database, EarningsRepository, SubOrderRepository};

/// Outcome of a split call.
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub order_id: String,
    /// True when the order spanned multiple sellers and sub-orders exist.
    pub is_split: bool,
    /// True when this call found the order already settled and wrote nothing.
    pub already_settled: bool,
    /// Empty for single-seller orders.
    pub sub_orders: Vec<SubOrder>,
    /// One per seller with at least one resolvable line.
    pub earnings: Vec<EarningsRecord>,
    /// Product ids the catalog did not recognize; their lines were skipped.
    pub skipped_product_ids: Vec<String>,
}

/// Splits paid orders into per-seller settlements.
pub struct OrderSplitter {
    db: Database,
    catalog: Arc<dyn CatalogService>,
    gateway: Arc<dyn NotificationGateway>,
}

impl OrderSplitter {
    /// Creates a new OrderSplitter.
    pub fn new(
        db: Database,
        catalog: Arc<dyn CatalogService>,
        gateway: Arc<dyn NotificationGateway>,
    ) -> Self {
        OrderSplitter {
            db,
            catalog,
            gateway,
        }
    }

    /// Settles a paid order. Idempotent per `order_id`: a second call
    /// returns the existing rows and writes nothing.
    pub async fn split(&self, order_id: &str, lines: &[OrderLine]) -> EngineResult<SplitResult> {
        info!(order_id, line_count = lines.len(), "Splitting order");

        validate_order_lines(order_id, lines)?;

        // Idempotency probe before any catalog work
        let existing = self.db.earnings().get_by_order(order_id).await?;
        if !existing.is_empty() {
            let sub_orders = self.db.sub_orders().get_by_order(order_id).await?;
            info!(
                order_id,
                sellers = existing.len(),
                "Order already settled, returning existing rows"
            );
            return Ok(SplitResult {
                order_id: order_id.to_string(),
                is_split: !sub_orders.is_empty(),
                already_settled: true,
                sub_orders,
                earnings: existing,
                skipped_product_ids: Vec::new(),
            });
        }

        let (groups, skipped_product_ids) = self.resolve_and_group(order_id, lines).await?;

        if groups.is_empty() {
            warn!(order_id, "No resolvable line items; nothing settled");
            return Ok(SplitResult {
                order_id: order_id.to_string(),
                is_split: false,
                already_settled: false,
                sub_orders: Vec::new(),
                earnings: Vec::new(),
                skipped_product_ids,
            });
        }

        // Settings are read fresh per order: admin rate changes apply to the
        // very next settlement
        let commission_settings = self.db.settings().commission().await?;
        let now = Utc::now();
        let payout_settings = self
            .db
            .settings()
            .payout()
            .await?
            .unwrap_or_else(|| PayoutSettings::fallback(now));
        let available_date = now + Duration::days(payout_settings.holding_period_days);

        let is_split = groups.len() > 1;
        let mut sub_orders = Vec::new();
        let mut earnings = Vec::new();
        let mut notices = Vec::new();

        let mut tx = self.db.pool().begin().await?;

        for (seller_id, group) in &groups {
            let gross: Money = group.iter().map(|(line, _)| line.line_total()).sum();
            let category_id = group
                .first()
                .and_then(|(_, product)| product.category_id.as_deref());
            let rate =
                resolve_commission_rate(commission_settings.as_ref(), seller_id, category_id);
            let breakdown = calculate_earnings(gross, rate);

            debug!(
                order_id,
                seller_id = %seller_id,
                gross_cents = breakdown.gross_cents,
                rate_bps = breakdown.commission_rate_bps,
                net_cents = breakdown.net_cents,
                "Settling seller group"
            );

            let sub_order_id = if is_split {
                let sub_order = SubOrder {
                    id: generate_sub_order_id(),
                    order_id: order_id.to_string(),
                    seller_id: seller_id.clone(),
                    subtotal_cents: gross.cents(),
                    item_count: group.len() as i64,
                    fulfillment_status: FulfillmentStatus::Pending,
                    created_at: now,
                    updated_at: now,
                };
                SubOrderRepository::insert(&mut tx, &sub_order).await?;

                for (line, product) in group {
                    let item = SubOrderItem {
                        id: generate_sub_order_item_id(),
                        sub_order_id: sub_order.id.clone(),
                        product_id: line.product_id.clone(),
                        sku_snapshot: product.sku.clone(),
                        title_snapshot: product.title.clone(),
                        unit_price_cents: line.unit_price_cents,
                        quantity: line.quantity,
                        line_total_cents: line.line_total().cents(),
                        created_at: now,
                    };
                    SubOrderRepository::insert_item(&mut tx, &item).await?;
                }

                let id = sub_order.id.clone();
                sub_orders.push(sub_order);
                Some(id)
            } else {
                None
            };

            let record = EarningsRecord {
                id: generate_earnings_id(),
                seller_id: seller_id.clone(),
                order_id: order_id.to_string(),
                sub_order_id: sub_order_id.clone(),
                gross_cents: breakdown.gross_cents,
                commission_rate_bps: breakdown.commission_rate_bps,
                commission_cents: breakdown.commission_cents,
                processing_fee_cents: breakdown.processing_fee_cents,
                platform_fee_cents: breakdown.platform_fee_cents,
                net_cents: breakdown.net_cents,
                status: EarningsStatus::Pending,
                available_date,
                payout_id: None,
                created_at: now,
                updated_at: now,
            };
            EarningsRepository::insert(&mut tx, &record).await?;

            notices.push(SettlementNotice {
                seller_id: seller_id.clone(),
                order_id: order_id.to_string(),
                sub_order_id,
                item_count: group.len() as i64,
                gross_cents: record.gross_cents,
                net_cents: record.net_cents,
            });
            earnings.push(record);
        }

        tx.commit().await?;

        // Post-commit, fire-and-forget
        for notice in &notices {
            if let Err(e) = self.gateway.settlement_created(notice).await {
                warn!(
                    seller_id = %notice.seller_id,
                    order_id,
                    error = %e,
                    "Settlement notification failed"
                );
            }
        }

        info!(
            order_id,
            sellers = earnings.len(),
            is_split,
            skipped = skipped_product_ids.len(),
            "Order settled"
        );

        Ok(SplitResult {
            order_id: order_id.to_string(),
            is_split,
            already_settled: false,
            sub_orders,
            earnings,
            skipped_product_ids,
        })
    }

    /// Marks a sub-order delivered and releases its earnings for payout
    /// ahead of the holding period.
    pub async fn confirm_sub_order_delivery(&self, sub_order_id: &str) -> EngineResult<()> {
        let now = Utc::now();
        self.db
            .sub_orders()
            .update_fulfillment_status(sub_order_id, FulfillmentStatus::Delivered, now)
            .await?;
        let released = self
            .db
            .earnings()
            .release_for_sub_order(sub_order_id, now)
            .await?;
        info!(sub_order_id, released, "Sub-order delivered, earnings released");
        Ok(())
    }

    /// Releases an order's earnings on delivery confirmation, for
    /// single-seller orders that have no sub-order row. Idempotent, and a
    /// no-op on multi-seller orders: those release per delivered sub-order.
    pub async fn confirm_order_delivery(&self, order_id: &str) -> EngineResult<u64> {
        let now = Utc::now();
        let released = self.db.earnings().release_for_order(order_id, now).await?;
        info!(order_id, released, "Order delivered, earnings released");
        Ok(released)
    }

    /// Resolves the order's distinct products and groups resolvable lines by
    /// seller. Returns the groups (ordered by seller id) and the skipped
    /// product ids.
    async fn resolve_and_group<'a>(
        &self,
        order_id: &str,
        lines: &'a [OrderLine],
    ) -> EngineResult<(
        BTreeMap<String, Vec<(&'a OrderLine, ResolvedProduct)>>,
        Vec<String>,
    )> {
        let mut seen = HashSet::new();
        let distinct: Vec<String> = lines
            .iter()
            .filter(|line| seen.insert(line.product_id.clone()))
            .map(|line| line.product_id.clone())
            .collect();

        let resolved = self.catalog.resolve_products(&distinct).await?;
        let by_id: HashMap<String, ResolvedProduct> = resolved
            .into_iter()
            .map(|product| (product.product_id.clone(), product))
            .collect();

        let mut groups: BTreeMap<String, Vec<(&OrderLine, ResolvedProduct)>> = BTreeMap::new();
        let mut skipped = Vec::new();

        for line in lines {
            match by_id.get(&line.product_id) {
                Some(product) => {
                    groups
                        .entry(product.seller_id.clone())
                        .or_default()
                        .push((line, product.clone()));
                }
                None => {
                    warn!(
                        order_id,
                        product_id = %line.product_id,
                        "Unknown product, skipping line"
                    );
                    if !skipped.contains(&line.product_id) {
                        skipped.push(line.product_id.clone());
                    }
                }
            }
        }

        Ok((groups, skipped))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::testutil::{line, test_db, FixtureCatalog, RecordingGateway};
    use std::collections::HashMap as StdHashMap;
    use vendora_core::{CommissionSettings, PayoutMethod};

    async fn splitter_with(
        db: &Database,
        catalog: FixtureCatalog,
    ) -> (OrderSplitter, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway::default());
        let splitter = OrderSplitter::new(db.clone(), Arc::new(catalog), gateway.clone());
        (splitter, gateway)
    }

    fn two_seller_catalog() -> FixtureCatalog {
        FixtureCatalog::new()
            .with_product("prod-a1", "seller-a", Some("electronics"))
            .with_product("prod-a2", "seller-a", None)
            .with_product("prod-b1", "seller-b", None)
    }

    #[tokio::test]
    async fn test_single_seller_order_skips_sub_orders() {
        let db = test_db().await;
        let (splitter, gateway) = splitter_with(&db, two_seller_catalog()).await;

        let result = splitter
            .split("o1", &[line("prod-a1", 3000, 1), line("prod-a2", 3000, 1)])
            .await
            .unwrap();

        assert!(!result.is_split);
        assert!(!result.already_settled);
        assert!(result.sub_orders.is_empty());
        assert_eq!(result.earnings.len(), 1);

        let record = &result.earnings[0];
        assert_eq!(record.seller_id, "seller-a");
        assert!(record.sub_order_id.is_none());
        assert_eq!(record.gross_cents, 6000);
        // Fallback 15%: 900 commission, 204 processing, net 4896
        assert_eq!(record.net_cents, 4896);
        assert!(record.is_consistent());

        assert!(!db.sub_orders().exists_for_order("o1").await.unwrap());
        assert_eq!(gateway.settlements.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_multi_seller_split_preserves_totals() {
        let db = test_db().await;
        let (splitter, gateway) = splitter_with(&db, two_seller_catalog()).await;

        // 10000 cents total: 6000 to seller-a, 4000 to seller-b
        let result = splitter
            .split("o1", &[line("prod-a1", 3000, 2), line("prod-b1", 2000, 2)])
            .await
            .unwrap();

        assert!(result.is_split);
        assert_eq!(result.sub_orders.len(), 2);
        assert_eq!(result.earnings.len(), 2);

        // Deterministic seller ordering
        assert_eq!(result.sub_orders[0].seller_id, "seller-a");
        assert_eq!(result.sub_orders[1].seller_id, "seller-b");

        // Sub-order subtotals sum to the parent order total
        let total: i64 = result.sub_orders.iter().map(|s| s.subtotal_cents).sum();
        assert_eq!(total, 10_000);

        // Fallback 15%: a = 6000→4896 net, b = 4000→3254 net
        assert_eq!(result.earnings[0].net_cents, 4896);
        assert_eq!(result.earnings[1].net_cents, 3254);
        assert_eq!(
            result.earnings[0].sub_order_id.as_deref(),
            Some(result.sub_orders[0].id.as_str())
        );

        // Item snapshots were frozen
        let items = db
            .sub_orders()
            .get_items(&result.sub_orders[0].id)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_total_cents, 6000);
        assert_eq!(items[0].sku_snapshot, "SKU-prod-a1");

        assert_eq!(gateway.settlements.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_second_split_returns_existing_rows() {
        let db = test_db().await;
        let (splitter, gateway) = splitter_with(&db, two_seller_catalog()).await;
        let lines = [line("prod-a1", 3000, 2), line("prod-b1", 2000, 2)];

        let first = splitter.split("o1", &lines).await.unwrap();
        let second = splitter.split("o1", &lines).await.unwrap();

        assert!(!first.already_settled);
        assert!(second.already_settled);
        assert!(second.is_split);
        assert_eq!(second.earnings.len(), 2);
        assert_eq!(second.sub_orders.len(), 2);

        // Nothing was written twice
        assert_eq!(db.earnings().get_by_order("o1").await.unwrap().len(), 2);
        // And nobody was notified twice
        assert_eq!(gateway.settlements.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_products_are_skipped() {
        let db = test_db().await;
        let (splitter, _) = splitter_with(&db, two_seller_catalog()).await;

        let result = splitter
            .split("o1", &[line("prod-a1", 3000, 1), line("prod-ghost", 500, 1)])
            .await
            .unwrap();

        assert_eq!(result.skipped_product_ids, vec!["prod-ghost".to_string()]);
        assert_eq!(result.earnings.len(), 1);
        assert_eq!(result.earnings[0].gross_cents, 3000);
    }

    #[tokio::test]
    async fn test_no_resolvable_lines_settles_nothing() {
        let db = test_db().await;
        let (splitter, gateway) = splitter_with(&db, FixtureCatalog::new()).await;

        let result = splitter.split("o1", &[line("prod-ghost", 500, 1)]).await.unwrap();

        assert!(!result.already_settled);
        assert!(result.earnings.is_empty());
        assert_eq!(result.skipped_product_ids.len(), 1);
        assert!(db.earnings().get_by_order("o1").await.unwrap().is_empty());
        assert!(gateway.settlements.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_outage_is_retryable() {
        let db = test_db().await;
        let (splitter, _) = splitter_with(&db, FixtureCatalog::unavailable()).await;

        let err = splitter
            .split("o1", &[line("prod-a1", 3000, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Catalog(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_order_is_rejected() {
        let db = test_db().await;
        let (splitter, _) = splitter_with(&db, two_seller_catalog()).await;

        let err = splitter.split("o1", &[]).await.unwrap_err();
        assert!(matches!(err, EngineError::Core(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_commission_settings_apply_per_group() {
        let db = test_db().await;

        let mut seller_rates = StdHashMap::new();
        seller_rates.insert("seller-a".to_string(), 1000_u32);
        let mut category_rates = StdHashMap::new();
        category_rates.insert("books".to_string(), 500_u32);
        db.settings()
            .upsert_commission(&CommissionSettings {
                id: "default".to_string(),
                default_rate_bps: 2000,
                category_rates,
                seller_rates,
                is_active: true,
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        let catalog = FixtureCatalog::new()
            .with_product("prod-a1", "seller-a", Some("books"))
            .with_product("prod-b1", "seller-b", Some("books"))
            .with_product("prod-c1", "seller-c", None);
        let (splitter, _) = splitter_with(&db, catalog).await;

        let result = splitter
            .split(
                "o1",
                &[
                    line("prod-a1", 1000, 1),
                    line("prod-b1", 1000, 1),
                    line("prod-c1", 1000, 1),
                ],
            )
            .await
            .unwrap();

        // seller override beats category; category beats default
        assert_eq!(result.earnings[0].commission_rate_bps, 1000); // seller-a
        assert_eq!(result.earnings[1].commission_rate_bps, 500); // seller-b, books
        assert_eq!(result.earnings[2].commission_rate_bps, 2000); // seller-c, default
    }

    #[tokio::test]
    async fn test_holding_period_from_settings() {
        let db = test_db().await;
        db.settings()
            .upsert_payout(&vendora_core::PayoutSettings {
                id: "default".to_string(),
                auto_payout_enabled: true,
                minimum_payout_cents: 1000,
                auto_approve_threshold_cents: 10_000,
                holding_period_days: 3,
                method: PayoutMethod::BankTransfer,
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        let (splitter, _) = splitter_with(&db, two_seller_catalog()).await;
        let result = splitter.split("o1", &[line("prod-a1", 3000, 1)]).await.unwrap();

        let record = &result.earnings[0];
        assert_eq!(record.status, EarningsStatus::Pending);
        let held_for = record.available_date - record.created_at;
        assert_eq!(held_for.num_days(), 3);
    }

    #[tokio::test]
    async fn test_delivery_confirmation_releases_early() {
        let db = test_db().await;
        let (splitter, _) = splitter_with(&db, two_seller_catalog()).await;

        let result = splitter
            .split("o1", &[line("prod-a1", 3000, 2), line("prod-b1", 2000, 2)])
            .await
            .unwrap();

        let delivered = &result.sub_orders[0];
        splitter
            .confirm_sub_order_delivery(&delivered.id)
            .await
            .unwrap();

        let fetched = db.sub_orders().get_by_id(&delivered.id).await.unwrap().unwrap();
        assert_eq!(fetched.fulfillment_status, FulfillmentStatus::Delivered);

        let records = db.earnings().get_by_order("o1").await.unwrap();
        let released = records
            .iter()
            .find(|r| r.sub_order_id.as_deref() == Some(delivered.id.as_str()))
            .unwrap();
        let held = records
            .iter()
            .find(|r| r.sub_order_id.as_deref() != Some(delivered.id.as_str()))
            .unwrap();
        assert_eq!(released.status, EarningsStatus::Available);
        assert_eq!(held.status, EarningsStatus::Pending);
    }

    #[tokio::test]
    async fn test_order_delivery_release_is_single_seller_only() {
        let db = test_db().await;
        let (splitter, _) = splitter_with(&db, two_seller_catalog()).await;

        splitter
            .split("o1", &[line("prod-a1", 3000, 2), line("prod-b1", 2000, 2)])
            .await
            .unwrap();

        // Multi-seller orders release per delivered sub-order; the
        // order-level path must not promote undelivered sellers wholesale
        assert_eq!(splitter.confirm_order_delivery("o1").await.unwrap(), 0);
        let records = db.earnings().get_by_order("o1").await.unwrap();
        assert!(records.iter().all(|r| r.status == EarningsStatus::Pending));
    }

    #[tokio::test]
    async fn test_single_seller_delivery_release() {
        let db = test_db().await;
        let (splitter, _) = splitter_with(&db, two_seller_catalog()).await;

        splitter.split("o1", &[line("prod-a1", 3000, 1)]).await.unwrap();

        assert_eq!(splitter.confirm_order_delivery("o1").await.unwrap(), 1);
        // Idempotent
        assert_eq!(splitter.confirm_order_delivery("o1").await.unwrap(), 0);
    }
}
